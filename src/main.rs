//! Match Blaster entry point
//!
//! Handles platform-specific initialization and runs the game loop.

/// Pair list used when the page does not provide one
const DEMO_PAIRS: &str = r#"{"pairs": [
    {"term": "Photosynthesis", "definition": "Plants turning light into chemical energy"},
    {"term": "Mitochondria", "definition": "Organelle that produces ATP"},
    {"term": "Osmosis", "definition": "Water moving across a membrane"},
    {"term": "Enzyme", "definition": "Protein that speeds up reactions"},
    {"term": "Chromosome", "definition": "Packaged strand of DNA"}
]}"#;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, MouseEvent, TouchEvent};

    use match_blaster::Settings;
    use match_blaster::consts::*;
    use match_blaster::renderer::{CanvasSurface, LineRenderer, LineStyle, RedrawTrigger, draw_field};
    use match_blaster::sim::{PairSet, Session, SessionPhase, TickInput, tick};
    use match_blaster::worksheet::{
        Column, DefinitionStatus, LayoutProvider, Rect, TermStatus, Worksheet,
    };

    const LINES_ID: &str = "worksheet-lines";

    /// Reads worksheet geometry from the live DOM
    #[derive(Clone)]
    struct DomLayout {
        document: Document,
    }

    impl DomLayout {
        fn rect_of(&self, id: &str) -> Option<Rect> {
            let r = self.document.get_element_by_id(id)?.get_bounding_client_rect();
            // Detached or display:none elements report an empty box
            if r.width() == 0.0 && r.height() == 0.0 {
                return None;
            }
            Some(Rect::new(
                r.left() as f32,
                r.top() as f32,
                r.width() as f32,
                r.height() as f32,
            ))
        }
    }

    impl LayoutProvider for DomLayout {
        fn surface_rect(&self) -> Option<Rect> {
            self.rect_of(LINES_ID)
        }

        fn row_rect(&self, column: Column, index: usize) -> Option<Rect> {
            self.rect_of(&column.row_id(index))
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        worksheet: Rc<RefCell<Worksheet>>,
        layout: DomLayout,
        field: CanvasSurface,
        lines: CanvasSurface,
        line_renderer: LineRenderer,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        lines_size: (u32, u32),
    }

    impl Game {
        /// Convert a canvas-relative CSS position to field coordinates
        fn to_field(&self, x: f32, y: f32) -> Vec2 {
            let canvas = self.field.canvas();
            let cw = canvas.client_width().max(1) as f32;
            let ch = canvas.client_height().max(1) as f32;
            Vec2::new(
                x * self.session.settings.field_width / cw,
                y * self.session.settings.field_height / ch,
            )
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                let events = tick(&mut self.session, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                if events.resolved.is_some() || events.spawned_round.is_some() {
                    self.line_renderer.notify(RedrawTrigger::RoundChanged);
                }

                // Clear one-shot inputs after processing
                self.input.fire = false;
                self.input.restart = None;
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            draw_field(&self.session, &mut self.field);

            self.lines.fit_to_client();
            let canvas = self.lines.canvas();
            let size = (canvas.width(), canvas.height());
            if size != self.lines_size {
                self.lines_size = size;
                self.line_renderer.notify(RedrawTrigger::Resize);
            }

            let worksheet = self.worksheet.borrow();
            self.line_renderer
                .frame(&worksheet, &self.layout, &mut self.lines);
        }

        /// Reflect row status and the tally in the worksheet DOM
        fn update_worksheet_dom(&self) {
            let document = &self.layout.document;
            let worksheet = self.worksheet.borrow();

            for i in 0..worksheet.terms().len() {
                if let Some(el) = document.get_element_by_id(&Column::Term.row_id(i)) {
                    let class = match worksheet.term_status(i) {
                        TermStatus::Active => "ws-row active",
                        TermStatus::Completed => "ws-row completed",
                        TermStatus::Pending => "ws-row pending",
                    };
                    set_class(&el, class);
                }
            }
            for j in 0..worksheet.definitions().len() {
                if let Some(el) = document.get_element_by_id(&Column::Definition.row_id(j)) {
                    let class = match worksheet.definition_status(j) {
                        DefinitionStatus::Correct => "ws-row correct",
                        DefinitionStatus::Wrong => "ws-row wrong",
                        DefinitionStatus::Unused => "ws-row",
                    };
                    set_class(&el, class);
                }
            }
            if let Some(el) = document.get_element_by_id("worksheet-summary") {
                let text = worksheet.summary().to_string();
                if el.text_content().as_deref() != Some(text.as_str()) {
                    el.set_text_content(Some(&text));
                }
            }
        }

        /// Back to round 0 with a fresh shuffle
        fn restart(&mut self, seed: u64) {
            self.input.restart = Some(seed);
            self.worksheet.borrow_mut().reset(seed);
            fill_definition_rows(&self.layout.document, &self.worksheet.borrow());
            self.line_renderer.notify(RedrawTrigger::ConnectionsChanged);
            log::info!("Quiz restarted with seed: {}", seed);
        }
    }

    fn set_class(el: &Element, class: &str) {
        if el.get_attribute("class").as_deref() != Some(class) {
            let _ = el.set_attribute("class", class);
        }
    }

    fn element_or_create(document: &Document, parent: &Element, tag: &str, id: &str) -> Result<Element, JsValue> {
        if let Some(el) = document.get_element_by_id(id) {
            return Ok(el);
        }
        let el = document.create_element(tag)?;
        el.set_id(id);
        parent.append_child(&el)?;
        Ok(el)
    }

    /// Pairs from `<script id="quiz-pairs" type="application/json">`, or the demo set
    fn load_pairs(document: &Document) -> Result<PairSet, match_blaster::QuizError> {
        match document
            .get_element_by_id("quiz-pairs")
            .and_then(|el| el.text_content())
        {
            Some(json) if !json.trim().is_empty() => PairSet::from_json(&json),
            _ => {
                log::info!("No pair data on the page, using the demo set");
                PairSet::from_json(super::DEMO_PAIRS)
            }
        }
    }

    /// Worksheet skeleton: two columns of rows and the overlay canvas
    fn build_worksheet_dom(document: &Document, worksheet: &Worksheet) -> Result<HtmlCanvasElement, JsValue> {
        let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
        let sheet = element_or_create(document, &body, "div", "worksheet")?;
        let _ = sheet.set_attribute("style", "position: relative;");

        let lines = element_or_create(document, &sheet, "canvas", LINES_ID)?;
        let _ = lines.set_attribute(
            "style",
            "position: absolute; inset: 0; width: 100%; height: 100%; pointer-events: none;",
        );

        let terms = element_or_create(document, &sheet, "div", "worksheet-terms")?;
        for (i, term) in worksheet.terms().iter().enumerate() {
            let row = element_or_create(document, &terms, "div", &Column::Term.row_id(i))?;
            row.set_text_content(Some(term));
        }
        element_or_create(document, &sheet, "div", "worksheet-definitions")?;
        fill_definition_rows(document, worksheet);
        element_or_create(document, &body, "div", "worksheet-summary")?;

        lines
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("worksheet-lines is not a canvas"))
    }

    fn fill_definition_rows(document: &Document, worksheet: &Worksheet) {
        let Some(column) = document.get_element_by_id("worksheet-definitions") else {
            return;
        };
        for (j, definition) in worksheet.definitions().iter().enumerate() {
            match element_or_create(document, &column, "div", &Column::Definition.row_id(j)) {
                Ok(row) => row.set_text_content(Some(definition)),
                Err(e) => log::warn!("Could not create definition row {}: {:?}", j, e),
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Match Blaster starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let pairs = match load_pairs(&document) {
            Ok(pairs) => pairs,
            Err(e) => {
                log::error!("Cannot start quiz: {}", e);
                if let Some(el) = document.get_element_by_id("error") {
                    el.set_text_content(Some(&e.to_string()));
                }
                return Err(JsValue::from_str(&e.to_string()));
            }
        };

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let worksheet = Rc::new(RefCell::new(Worksheet::new(&pairs, seed)));
        let layout = DomLayout {
            document: document.clone(),
        };

        let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
        let field_canvas: HtmlCanvasElement = element_or_create(&document, &body, "canvas", "canvas")?
            .dyn_into()
            .map_err(|_| JsValue::from_str("#canvas is not a canvas"))?;
        field_canvas.set_width(settings.field_width as u32);
        field_canvas.set_height(settings.field_height as u32);
        let lines_canvas = build_worksheet_dom(&document, &worksheet.borrow())?;

        // The callback records each resolved round on the worksheet
        let session = {
            let worksheet = worksheet.clone();
            let layout = layout.clone();
            Session::from_pair_set(pairs, settings, seed, move |outcome| {
                if let Err(e) = worksheet.borrow_mut().record_outcome(outcome, &layout) {
                    log::error!("Outcome not recorded: {}", e);
                }
            })
        };

        let game = Rc::new(RefCell::new(Game {
            session,
            worksheet,
            layout,
            field: CanvasSurface::new(field_canvas.clone())?,
            lines: CanvasSurface::new(lines_canvas)?,
            line_renderer: LineRenderer::new(LineStyle::default()),
            accumulator: 0.0,
            last_time: 0.0,
            input: TickInput::default(),
            lines_size: (0, 0),
        }));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&field_canvas, game.clone());
        setup_layout_listeners(game.clone());
        setup_restart_button(game.clone());
        setup_worksheet_clicks(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Match Blaster running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move: aim
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.to_field(event.offset_x() as f32, event.offset_y() as f32);
                g.input.pointer = Some(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down: fire, or play again once complete
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.session.phase() == SessionPhase::Complete {
                    g.restart(js_sys::Date::now() as u64);
                    return;
                }
                let pos = g.to_field(event.offset_x() as f32, event.offset_y() as f32);
                g.input.pointer = Some(pos);
                g.input.fire = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start: aim and fire
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if g.session.phase() == SessionPhase::Complete {
                    g.restart(js_sys::Date::now() as u64);
                    return;
                }
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    let pos = g.to_field(x, y);
                    g.input.pointer = Some(pos);
                }
                g.input.fire = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else {
                return;
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "Enter" => g.input.fire = true,
                    "r" | "R" => g.restart(js_sys::Date::now() as u64),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Resize and scroll invalidate the worksheet lines
    fn setup_layout_listeners(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().line_renderer.notify(RedrawTrigger::Resize);
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Capture phase so scrolling inside any container is seen too
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().line_renderer.notify(RedrawTrigger::Scroll);
            });
            let _ = window.add_event_listener_with_callback_and_bool(
                "scroll",
                closure.as_ref().unchecked_ref(),
                true,
            );
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_worksheet_dom();
        }

        request_animation_frame(game);
    }

    /// Row clicks pair a term with a definition for the live preview line
    fn setup_worksheet_clicks(game: Rc<RefCell<Game>>) {
        let Some(sheet) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("worksheet"))
        else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(row) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest("[id^='term-'], [id^='definition-']").ok().flatten())
            else {
                return;
            };
            let Some((column, index)) = Column::parse_row_id(&row.id()) else {
                return;
            };

            let mut g = game.borrow_mut();
            let live = g.worksheet.borrow_mut().pick(column, index);
            if let Some(sel) = live {
                log::debug!("Live line: term {} -> definition {}", sel.term_index, sel.definition_index);
            }
            g.line_renderer.notify(RedrawTrigger::ConnectionsChanged);
        });
        let _ = sheet.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Native mode: play one scripted session headless and print the tally
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Match Blaster (native) starting...");

    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::rc::Rc;

    use match_blaster::consts::SIM_DT;
    use match_blaster::renderer::{LineRenderer, LineStyle, RecordingSurface, draw_field};
    use match_blaster::sim::{PairSet, Session, SessionPhase, TickInput, tick};
    use match_blaster::worksheet::{ColumnLayout, Rect, Worksheet};
    use match_blaster::{QuizError, Settings};

    /// Give up after this much simulated time
    const MAX_SIM_SECS: f32 = 600.0;

    pub fn run() -> Result<(), QuizError> {
        let pairs = match std::env::args().nth(1) {
            Some(path) => {
                log::info!("Loading pairs from {}", path);
                let json = std::fs::read_to_string(&path)?;
                PairSet::from_json(&json)?
            }
            None => PairSet::from_json(super::DEMO_PAIRS)?,
        };

        let settings = Settings::load();
        let seed = 0x5eed;
        let worksheet = Rc::new(RefCell::new(Worksheet::new(&pairs, seed)));
        let layout = Rc::new(ColumnLayout::new(
            Rect::new(0.0, 0.0, 640.0, 480.0),
            pairs.len(),
            pairs.len(),
        ));

        let mut session = {
            let worksheet = worksheet.clone();
            let layout = layout.clone();
            Session::from_pair_set(pairs, settings, seed, move |outcome| {
                if let Err(e) = worksheet.borrow_mut().record_outcome(outcome, &*layout) {
                    log::error!("Outcome not recorded: {}", e);
                }
            })
        };

        let mut field = RecordingSurface::new(
            session.settings.field_width,
            session.settings.field_height,
        );
        let mut lines = RecordingSurface::new(layout.surface.width, layout.surface.height);
        let mut line_renderer = LineRenderer::new(LineStyle::default());

        // Autoplay: aim at the correct target of each round, one shot at a time
        let mut elapsed = 0.0;
        while session.phase() != SessionPhase::Complete && elapsed < MAX_SIM_SECS {
            let aim = session
                .targets()
                .iter()
                .find(|t| t.correct && t.pos.y > 0.0)
                .map(|t| t.pos);
            let input = TickInput {
                pointer: aim,
                fire: aim.is_some()
                    && session.phase() == SessionPhase::AwaitingShot
                    && session.projectiles().active_count() == 0,
                restart: None,
            };
            let events = tick(&mut session, &input, SIM_DT);
            if let Some(res) = events.resolved {
                println!(
                    "Round {}: {} -> {}",
                    res.round_index + 1,
                    res.definition,
                    if res.correct { "correct" } else { "wrong" }
                );
            }
            line_renderer.frame(&worksheet.borrow(), &*layout, &mut lines);
            elapsed += SIM_DT;
        }

        draw_field(&session, &mut field);
        match session.summary() {
            Some(summary) => println!("{summary}"),
            None => println!("Stopped after {elapsed:.0}s: {}", session.score_text()),
        }
        println!("Worksheet: {}", worksheet.borrow().summary());
        println!(
            "{} lines drawn over {} redraws",
            lines.curves().count(),
            line_renderer.redraws()
        );
        log::debug!("Final field frame: {} draw commands", field.commands().len());

        session.shutdown();
        Ok(())
    }
}
