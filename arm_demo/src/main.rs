//! Articulated arm demo
//!
//! Builds a three-segment hinge arm in a scene graph and animates it purely
//! through scheduled operations: interpolators swing the joints, a smoothed
//! follow camera chases a wandering marker, a second camera rides the hand,
//! a picker samples the scene under the marker and a screenshot of a
//! synthetic frame buffer is written to disk. The demo quits by itself.

use std::cell::{Cell, RefCell};
use std::f32::consts::FRAC_PI_3;
use std::rc::Rc;

use frame_engine::camera::{BasicPlaceableVerticalFocuser, NodePlaceable};
use frame_engine::operations::ScheduledTraversal;
use frame_engine::pool::NodeList;
use frame_engine::prelude::*;
use frame_engine::scene::PickResult;
use rand::prelude::*;
use rand::rngs::StdRng;

// Configuration constants
const SEGMENT_LENGTHS: [f32; 3] = [4.0, 3.0, 2.0];
const SWING_PERIOD_MS: f64 = 1500.0;
const PICK_PERIOD_MS: f64 = 500.0;
const CAMERA_HEIGHT: f32 = 30.0;
const CAMERA_SMOOTHING: f32 = 0.1;
const SCREENSHOT_FRAME: u32 = 120;
const MAX_FRAMES: u32 = 600;

/// Procedural stand-in for a renderer's back buffer
struct SyntheticFrame {
    width: u32,
    height: u32,
    phase: u8,
}

impl FrameGrabber for SyntheticFrame {
    fn frame_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_pixels(&mut self, pixels: &mut [u8]) -> Result<(), OperationError> {
        let width = self.width as usize;
        for (i, pixel) in pixels.chunks_exact_mut(4).enumerate() {
            let (x, y) = (i % width, i / width);
            pixel[0] = (x * 255 / width.max(1)) as u8;
            pixel[1] = (y * 255 / self.height.max(1) as usize) as u8;
            pixel[2] = self.phase;
            pixel[3] = 0;
        }
        self.phase = self.phase.wrapping_add(16);
        Ok(())
    }
}

pub struct ArmDemoApp {
    graph: Rc<RefCell<SceneGraph>>,
    joints: Vec<Rc<RefCell<HingeJoint>>>,
    follow_camera: Rc<RefCell<Camera>>,
    hand_camera: Rc<RefCell<Camera>>,
    marker: Rc<Cell<Point3>>,
    frame: Rc<RefCell<SyntheticFrame>>,
    rng: StdRng,
    frames: u32,
}

impl ArmDemoApp {
    fn new(seed: u64) -> Self {
        Self {
            graph: Rc::new(RefCell::new(SceneGraph::new())),
            joints: Vec::new(),
            follow_camera: Rc::new(RefCell::new(Camera::default())),
            hand_camera: Rc::new(RefCell::new(Camera::default())),
            marker: Rc::new(Cell::new(Point3::origin())),
            frame: Rc::new(RefCell::new(SyntheticFrame { width: 64, height: 48, phase: 0 })),
            rng: StdRng::seed_from_u64(seed),
            frames: 0,
        }
    }

    /// Chain one hinge per segment, each ending in a small box
    fn build_arm(&mut self) -> Result<(), AppError> {
        let mut graph = self.graph.borrow_mut();
        let mut parent: Option<Rc<RefCell<HingeJoint>>> = None;
        for (i, &length) in SEGMENT_LENGTHS.iter().enumerate() {
            let joint = HingeJoint::new(&mut graph, Vec3::z(), Vec3::x(), length, 0.0)?;
            match &parent {
                Some(parent) => parent.borrow().add_child(&mut graph, &joint)?,
                None => {
                    let root = graph.root();
                    joint.attach_to(&mut graph, root)?;
                }
            }

            let tip = graph.create_shape(AABB::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5)));
            graph.set_name(tip, format!("tip_{i}"))?;
            joint.add_child_node(&mut graph, tip)?;

            let joint = Rc::new(RefCell::new(joint));
            self.joints.push(Rc::clone(&joint));
            parent = Some(joint);
        }
        log::info!("Built arm with {} segments ({} nodes)", self.joints.len(), graph.len());
        Ok(())
    }

    /// Every swing period, each joint eases toward a new random angle
    fn schedule_swings(&self, engine: &mut Engine) -> Result<(), AppError> {
        let timing_mode = engine.config().timing_mode;
        let period = timing_mode.from_millis(SWING_PERIOD_MS);
        let graph = Rc::clone(&self.graph);
        let joints = self.joints.clone();
        let mut rng = StdRng::seed_from_u64(7);

        let swings = Interval::from_fn(period, true, move |frame: &mut FrameContext<'_>| {
            for joint in &joints {
                let from = joint.borrow().angle();
                let to = rng.gen_range(-FRAC_PI_3..FRAC_PI_3);
                let target = HingeAngleTarget::new(Rc::clone(joint), Rc::clone(&graph));
                frame.schedule(ValueInterpolator::new(period, from, to, target));
            }
            Ok(IntervalControl::Continue)
        })?;
        engine.scheduler_mut().schedule_operation(swings);
        Ok(())
    }

    /// Periodically cast a ray straight down through the marker
    fn schedule_picks(&self, engine: &mut Engine) -> Result<(), AppError> {
        let period = engine.config().timing_mode.from_millis(PICK_PERIOD_MS);
        let graph = Rc::clone(&self.graph);
        let marker = Rc::clone(&self.marker);

        let picks = Interval::from_fn(period, true, move |frame: &mut FrameContext<'_>| {
            let origin = marker.get() + Vec3::new(0.0, 0.0, CAMERA_HEIGHT);
            let mut picker = frame.pools().allocate_picker();
            picker.configure(Rc::clone(&graph), origin, -Vec3::z(), |hits: &[PickResult]| {
                if let Some(nearest) = hits.first() {
                    log::info!("Marker is over {} shape(s), nearest at {:.2}", hits.len(), nearest.distance);
                }
            });
            frame.schedule(picker);
            Ok(IntervalControl::Continue)
        })?;
        engine.scheduler_mut().schedule_operation(picks);
        Ok(())
    }

    fn attach_cameras(&self, engine: &mut Engine) -> Result<(), AppError> {
        let scheduler = engine.scheduler_mut();
        SmoothPlaceableVerticalFocuser::attach(
            scheduler,
            self.follow_camera.clone(),
            self.marker.clone(),
            CAMERA_HEIGHT,
            CAMERA_SMOOTHING,
        )?;

        if let Some(hand) = self.joints.last() {
            let hand = NodePlaceable::new(Rc::clone(&self.graph), hand.borrow().translation_transform_group());
            BasicPlaceableVerticalFocuser::attach(scheduler, self.hand_camera.clone(), Rc::new(hand), 10.0);
        }
        Ok(())
    }

    fn request_screenshot(&self, engine: &mut Engine) {
        let path = std::env::temp_dir().join("arm_demo.png");
        let scheduler = engine.scheduler_mut();
        let mut screenshot = scheduler.pools_mut().allocate_screenshot();
        screenshot.configure(self.frame.clone(), path).set_background(true);
        scheduler.schedule_operation(screenshot);
    }

    /// Random walk in the XY plane, kept within reach of the arm
    fn wander(&mut self) {
        let step = Vec3::new(self.rng.gen_range(-0.2..0.2), self.rng.gen_range(-0.2..0.2), 0.0);
        let reach: f32 = SEGMENT_LENGTHS.iter().sum();
        let mut next = self.marker.get() + step;
        let distance = next.coords.norm();
        if distance > reach {
            next = Point3::from(next.coords * (reach / distance));
        }
        self.marker.set(next);
    }
}

impl Application for ArmDemoApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        log::info!("Initializing arm demo...");
        self.build_arm()?;
        self.schedule_swings(engine)?;
        self.schedule_picks(engine)?;
        self.attach_cameras(engine)?;

        if let Some(base) = self.joints.first() {
            let root = base.borrow().rotation_transform_group();
            engine.scheduler_mut().schedule_operation(ScheduledTraversal::new(
                Rc::clone(&self.graph),
                root,
                |scene: &SceneGraph, nodes: &NodeList| {
                    let shapes = nodes.iter().filter(|&&node| scene.node(node).is_some_and(|n| !n.is_group())).count();
                    log::info!("Arm holds {} nodes, {} of them shapes", nodes.len(), shapes);
                    Ok(())
                },
            ));
        }
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _frame_time: i64) -> Result<(), AppError> {
        self.frames += 1;
        self.wander();

        if self.frames == SCREENSHOT_FRAME {
            self.request_screenshot(engine);
        }
        if self.frames % 60 == 0 {
            let graph = self.graph.borrow();
            if let Some(hand) = self.joints.last() {
                let end = hand.borrow().end_position(&graph)?;
                log::info!(
                    "Frame {}: hand at ({:.2}, {:.2}), follow camera over ({:.2}, {:.2}), {} operations",
                    self.frames,
                    end.x,
                    end.y,
                    self.follow_camera.borrow().target.x,
                    self.follow_camera.borrow().target.y,
                    engine.scheduler().len()
                );
            }
        }
        if self.frames >= MAX_FRAMES {
            engine.quit();
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        if let Some(stats) = engine.frame_stats() {
            log::info!("Last report: {:.1} fps over {} frames", stats.fps, stats.frames);
        }
        let pools = engine.scheduler().pools();
        log::info!(
            "Pools: {} pickers, {} screenshots created",
            pools.pickers().created(),
            pools.screenshots().created()
        );
        engine.scheduler_mut().clear();
        log::info!("Arm demo finished after {} frames", self.frames);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };

    let mut app = ArmDemoApp::new(42);
    Engine::run(config, &mut app)?;
    Ok(())
}
