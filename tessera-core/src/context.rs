//! Startup sequencing and the main-loop step
//!
//! [`Context`] owns the UI instance and everything setup produces. The
//! firmware creates one, calls [`Context::start`] once with the board's
//! panel, touch controller and backlight, then calls [`Context::step`] from
//! its loop forever.

use alloc::rc::Rc;

use tessera_hal::gpio::OutputPin;
use tessera_hal::panel::DisplayPanel;
use tessera_hal::touch::TouchController;
use tessera_ui::{TickReport, Ui, UiError};

use crate::bridge::{self, FlushStats};
use crate::buffer::{self, AllocationFailure, MemoryRegion, PixelAllocator};
use crate::config::{AllocFailurePolicy, RenderConfig};
use crate::scene::{self, Scene};

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Before [`Context::start`] has run
    Boot,
    /// Steady state, entered once startup finishes
    Running,
}

/// Startup failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupError {
    /// No pool could hold the draw buffer
    Allocation(AllocationFailure),
    /// Scene creation hit a UI limit
    Ui(UiError),
}

impl From<AllocationFailure> for SetupError {
    fn from(e: AllocationFailure) -> Self {
        SetupError::Allocation(e)
    }
}

impl From<UiError> for SetupError {
    fn from(e: UiError) -> Self {
        SetupError::Ui(e)
    }
}

/// What startup achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StartReport {
    /// Touch controller initialized without error
    pub touch_ok: bool,
    /// Panel started without error
    pub panel_ok: bool,
    /// Panel resolution
    pub width: u16,
    pub height: u16,
    /// Draw buffer size in pixel units
    pub buffer_len: usize,
    pub buffer_region: MemoryRegion,
}

/// Firmware state owned by the main task
pub struct Context<'a> {
    ui: Ui<'a>,
    scene: Option<Scene>,
    phase: Phase,
    render: RenderConfig,
    stats: Rc<FlushStats>,
}

impl<'a> Context<'a> {
    pub fn new(render: RenderConfig) -> Self {
        Self {
            ui: Ui::with_config(render.ui_config()),
            scene: None,
            phase: Phase::Boot,
            render,
            stats: Rc::new(FlushStats::default()),
        }
    }

    /// Bring up the hardware, the UI and the scene
    ///
    /// Touch and panel start-up errors are reported, not fatal. If the draw
    /// buffer cannot be allocated nothing is registered, no scene is built
    /// and the error is returned; the context still moves to
    /// [`Phase::Running`] so the loop can keep stepping.
    pub fn start<P, T, B, A>(
        &mut self,
        mut panel: P,
        mut touch: T,
        mut backlight: B,
        allocator: &mut A,
    ) -> Result<StartReport, SetupError>
    where
        P: DisplayPanel + 'a,
        T: TouchController + 'a,
        B: OutputPin,
        A: PixelAllocator + ?Sized,
    {
        self.phase = Phase::Running;

        let panel_ok = panel.begin().is_ok();
        backlight.set_high();
        let touch_ok = touch.init().is_ok();

        let (width, height) = (panel.width(), panel.height());
        let buffer = buffer::allocate(width, height, self.render.buffer_divisor, allocator)?;
        let report = StartReport {
            touch_ok,
            panel_ok,
            width,
            height,
            buffer_len: buffer.len(),
            buffer_region: buffer.region(),
        };

        self.ui.register_display(bridge::display_driver(
            panel,
            buffer.into_pixels(),
            self.render.swap_bytes,
            self.stats.clone(),
        ));
        self.ui.register_input(bridge::input_device(touch));
        self.scene = Some(scene::build(&mut self.ui)?);

        Ok(report)
    }

    /// Enter [`Phase::Running`] with nothing registered
    ///
    /// For boards whose panel could not be constructed at all (no memory
    /// for its frame). The loop keeps stepping; every tick is empty.
    pub fn start_headless(&mut self) {
        self.phase = Phase::Running;
    }

    /// One main-loop iteration
    ///
    /// Does nothing before startup; afterwards runs whatever UI work is due
    /// at `now_ms`.
    pub fn step(&mut self, now_ms: u64) -> Result<TickReport, UiError> {
        match self.phase {
            Phase::Boot => Ok(TickReport::default()),
            Phase::Running => self.ui.tick(now_ms),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Scene handles, present once startup succeeded
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn ui(&self) -> &Ui<'a> {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut Ui<'a> {
        &mut self.ui
    }

    pub fn flush_stats(&self) -> &FlushStats {
        &self.stats
    }

    /// Sleep between iterations
    pub fn loop_period_ms(&self) -> u32 {
        self.render.loop_period_ms
    }

    pub fn alloc_failure_policy(&self) -> AllocFailurePolicy {
        self.render.on_alloc_failure
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::cell::{Cell, RefCell};
    use std::boxed::Box;
    use std::rc::Rc as StdRc;
    use std::vec;
    use std::vec::Vec;
    use tessera_hal::panel::ByteOrder;

    use crate::scene::{PRESSED_TEXT, TITLE_TEXT};

    /// Panel recording flushed areas into a shared log
    struct MockPanel {
        width: u16,
        height: u16,
        begin_ok: bool,
        log: StdRc<RefCell<Vec<(u16, u16, u16, u16)>>>,
    }

    impl MockPanel {
        fn new(log: &StdRc<RefCell<Vec<(u16, u16, u16, u16)>>>) -> Self {
            Self {
                width: 800,
                height: 480,
                begin_ok: true,
                log: log.clone(),
            }
        }
    }

    impl DisplayPanel for MockPanel {
        type Error = ();

        fn begin(&mut self) -> Result<(), ()> {
            if self.begin_ok {
                Ok(())
            } else {
                Err(())
            }
        }

        fn width(&self) -> u16 {
            self.width
        }

        fn height(&self) -> u16 {
            self.height
        }

        fn draw_pixel_block(
            &mut self,
            x: u16,
            y: u16,
            _pixels: &[u16],
            w: u16,
            h: u16,
            _order: ByteOrder,
        ) -> Result<(), ()> {
            self.log.borrow_mut().push((x, y, w, h));
            Ok(())
        }
    }

    /// Touch controller replaying a script of (touched, point) samples
    struct ScriptedTouch {
        script: StdRc<RefCell<Vec<Option<(i32, i32)>>>>,
        current: Option<(i32, i32)>,
        init_ok: bool,
    }

    impl TouchController for ScriptedTouch {
        type Error = ();

        fn init(&mut self) -> Result<(), ()> {
            if self.init_ok {
                Ok(())
            } else {
                Err(())
            }
        }

        fn has_signal(&mut self) -> bool {
            let mut script = self.script.borrow_mut();
            self.current = if script.is_empty() { None } else { script.remove(0) };
            true
        }

        fn is_touched(&mut self) -> bool {
            self.current.is_some()
        }

        fn is_released(&mut self) -> bool {
            self.current.is_none()
        }

        fn last_point(&self) -> (i32, i32) {
            self.current.unwrap_or((0, 0))
        }
    }

    struct Backlight(StdRc<Cell<bool>>);

    impl OutputPin for Backlight {
        fn set_high(&mut self) {
            self.0.set(true);
        }

        fn set_low(&mut self) {
            self.0.set(false);
        }

        fn is_set_high(&self) -> bool {
            self.0.get()
        }
    }

    struct LeakAllocator {
        dma: bool,
        general: bool,
        requested: Vec<usize>,
    }

    impl PixelAllocator for LeakAllocator {
        fn alloc_pixels(&mut self, region: MemoryRegion, len: usize) -> Option<&'static mut [u16]> {
            self.requested.push(len);
            let available = match region {
                MemoryRegion::Dma => self.dma,
                MemoryRegion::General => self.general,
            };
            available.then(|| Box::leak(vec![0u16; len].into_boxed_slice()) as &'static mut [u16])
        }
    }

    struct Rig {
        log: StdRc<RefCell<Vec<(u16, u16, u16, u16)>>>,
        script: StdRc<RefCell<Vec<Option<(i32, i32)>>>>,
        backlight: StdRc<Cell<bool>>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                log: StdRc::new(RefCell::new(Vec::new())),
                script: StdRc::new(RefCell::new(Vec::new())),
                backlight: StdRc::new(Cell::new(false)),
            }
        }

        fn touch(&self) -> ScriptedTouch {
            ScriptedTouch {
                script: self.script.clone(),
                current: None,
                init_ok: true,
            }
        }
    }

    fn started(rig: &Rig) -> Context<'static> {
        let mut ctx = Context::new(RenderConfig::default());
        let mut alloc = LeakAllocator {
            dma: true,
            general: true,
            requested: Vec::new(),
        };
        ctx.start(
            MockPanel::new(&rig.log),
            rig.touch(),
            Backlight(rig.backlight.clone()),
            &mut alloc,
        )
        .unwrap();
        ctx
    }

    #[test]
    fn test_step_before_start_is_noop() {
        let mut ctx = Context::new(RenderConfig::default());
        assert_eq!(ctx.phase(), Phase::Boot);
        assert_eq!(ctx.step(0).unwrap(), TickReport::default());
    }

    #[test]
    fn test_headless_start_keeps_stepping() {
        let mut ctx = Context::new(RenderConfig::default());
        ctx.start_headless();
        assert_eq!(ctx.phase(), Phase::Running);
        assert!(!ctx.ui().has_display());
        assert!(ctx.scene().is_none());
        for i in 0..10 {
            assert_eq!(ctx.step(i * 5).unwrap(), TickReport::default());
        }
    }

    #[test]
    fn test_start_registers_everything() {
        let rig = Rig::new();
        let mut ctx = Context::new(RenderConfig::default());
        let mut alloc = LeakAllocator {
            dma: false,
            general: true,
            requested: Vec::new(),
        };
        let report = ctx
            .start(
                MockPanel::new(&rig.log),
                rig.touch(),
                Backlight(rig.backlight.clone()),
                &mut alloc,
            )
            .unwrap();

        assert_eq!(alloc.requested, [96_000, 96_000]);
        assert_eq!(report.buffer_len, 96_000);
        assert_eq!(report.buffer_region, MemoryRegion::General);
        assert!(report.panel_ok && report.touch_ok);
        assert!(rig.backlight.get());
        assert_eq!(ctx.phase(), Phase::Running);
        assert!(ctx.ui().has_display());
        assert!(ctx.ui().has_input());
        assert!(ctx.scene().is_some());
    }

    #[test]
    fn test_allocation_failure_skips_registration() {
        let rig = Rig::new();
        let mut ctx = Context::new(RenderConfig::default());
        let mut alloc = LeakAllocator {
            dma: false,
            general: false,
            requested: Vec::new(),
        };
        let err = ctx
            .start(
                MockPanel::new(&rig.log),
                rig.touch(),
                Backlight(rig.backlight.clone()),
                &mut alloc,
            )
            .unwrap_err();

        assert_eq!(err, SetupError::Allocation(AllocationFailure { requested: 96_000 }));
        assert_eq!(ctx.phase(), Phase::Running);
        assert!(!ctx.ui().has_display());
        assert!(!ctx.ui().has_input());
        assert!(ctx.scene().is_none());

        // The loop keeps running with nothing to draw
        for i in 0..100 {
            assert_eq!(ctx.step(i * 5).unwrap(), TickReport::default());
        }
        assert!(rig.log.borrow().is_empty());
    }

    #[test]
    fn test_hardware_errors_are_not_fatal() {
        let rig = Rig::new();
        let mut ctx = Context::new(RenderConfig::default());
        let mut alloc = LeakAllocator {
            dma: true,
            general: true,
            requested: Vec::new(),
        };
        let mut panel = MockPanel::new(&rig.log);
        panel.begin_ok = false;
        let mut touch = rig.touch();
        touch.init_ok = false;

        let report = ctx
            .start(panel, touch, Backlight(rig.backlight.clone()), &mut alloc)
            .unwrap();
        assert!(!report.panel_ok);
        assert!(!report.touch_ok);
        assert!(ctx.scene().is_some());
    }

    #[test]
    fn test_first_refresh_covers_screen_in_quarters() {
        let rig = Rig::new();
        let mut ctx = started(&rig);

        ctx.step(0).unwrap();

        let log = rig.log.borrow();
        assert!(log.len() >= 4);
        let covered: usize = log.iter().map(|&(_, _, w, h)| w as usize * h as usize).sum();
        assert_eq!(covered, 800 * 480);
        for &(x, y, w, h) in log.iter() {
            assert!(x as u32 + w as u32 <= 800);
            assert!(y as u32 + h as u32 <= 480);
        }
        assert_eq!(ctx.flush_stats().flushes(), log.len() as u32);
        assert_eq!(ctx.flush_stats().errors(), 0);
    }

    #[test]
    fn test_tap_on_button_changes_title() {
        let rig = Rig::new();
        let mut ctx = started(&rig);
        let scene = *ctx.scene().unwrap();

        // Layout and first draw
        ctx.step(0).unwrap();
        assert_eq!(ctx.ui().text(scene.title), Some(TITLE_TEXT));

        let area = ctx.ui().tree().get(scene.button).unwrap().area();
        let center = area.to_rectangle().center();
        rig.script
            .borrow_mut()
            .extend([Some((center.x, center.y)), None]);
        rig.log.borrow_mut().clear();

        let mut now = 0;
        for _ in 0..40 {
            now += 5;
            ctx.step(now).unwrap();
        }

        assert_eq!(ctx.ui().text(scene.title), Some(PRESSED_TEXT));
        // Only the changed regions were redrawn
        let redrawn: usize = rig
            .log
            .borrow()
            .iter()
            .map(|&(_, _, w, h)| w as usize * h as usize)
            .sum();
        assert!(redrawn > 0);
        assert!(redrawn < 800 * 480);
    }

    #[test]
    fn test_release_off_button_does_not_click() {
        let rig = Rig::new();
        let mut ctx = started(&rig);
        let scene = *ctx.scene().unwrap();
        ctx.step(0).unwrap();

        let area = ctx.ui().tree().get(scene.button).unwrap().area();
        let center = area.to_rectangle().center();
        rig.script
            .borrow_mut()
            .extend([Some((center.x, center.y)), Some((5, 470)), None]);

        let mut now = 0;
        for _ in 0..40 {
            now += 5;
            ctx.step(now).unwrap();
        }
        assert_eq!(ctx.ui().text(scene.title), Some(TITLE_TEXT));
    }

    /// Wraps a mock and records when its bring-up call happens
    struct Ordered<M> {
        inner: M,
        order: StdRc<RefCell<Vec<&'static str>>>,
    }

    impl DisplayPanel for Ordered<MockPanel> {
        type Error = ();

        fn begin(&mut self) -> Result<(), ()> {
            self.order.borrow_mut().push("panel");
            self.inner.begin()
        }

        fn width(&self) -> u16 {
            self.inner.width()
        }

        fn height(&self) -> u16 {
            self.inner.height()
        }

        fn draw_pixel_block(
            &mut self,
            x: u16,
            y: u16,
            pixels: &[u16],
            w: u16,
            h: u16,
            order: ByteOrder,
        ) -> Result<(), ()> {
            self.inner.draw_pixel_block(x, y, pixels, w, h, order)
        }
    }

    impl TouchController for Ordered<ScriptedTouch> {
        type Error = ();

        fn init(&mut self) -> Result<(), ()> {
            self.order.borrow_mut().push("touch");
            self.inner.init()
        }

        fn has_signal(&mut self) -> bool {
            self.inner.has_signal()
        }

        fn is_touched(&mut self) -> bool {
            self.inner.is_touched()
        }

        fn is_released(&mut self) -> bool {
            self.inner.is_released()
        }

        fn last_point(&self) -> (i32, i32) {
            self.inner.last_point()
        }
    }

    impl OutputPin for Ordered<Backlight> {
        fn set_high(&mut self) {
            self.order.borrow_mut().push("backlight");
            self.inner.set_high();
        }

        fn set_low(&mut self) {
            self.inner.set_low();
        }

        fn is_set_high(&self) -> bool {
            self.inner.is_set_high()
        }
    }

    #[test]
    fn test_panel_lit_before_touch_init() {
        let rig = Rig::new();
        let order = StdRc::new(RefCell::new(Vec::new()));
        let mut ctx = Context::new(RenderConfig::default());
        let mut alloc = LeakAllocator {
            dma: true,
            general: true,
            requested: Vec::new(),
        };

        ctx.start(
            Ordered {
                inner: MockPanel::new(&rig.log),
                order: order.clone(),
            },
            Ordered {
                inner: rig.touch(),
                order: order.clone(),
            },
            Ordered {
                inner: Backlight(rig.backlight.clone()),
                order: order.clone(),
            },
            &mut alloc,
        )
        .unwrap();

        assert_eq!(*order.borrow(), vec!["panel", "backlight", "touch"]);
        assert!(rig.backlight.get());
    }
}
