//! Headless cat scene driven by a coroutine pool
//!
//! Every `spawn.interval` seconds a batch of cats appears just below the
//! bottom edge. Each cat is a coroutine running `script.function` over a
//! [`CatState`]. The scene steps them once per frame and drops the ones that
//! leave the scene rectangle stretched by `margin`.

use crate::config::Config;
use crate::coroutine::{CoroutinePool, Vec2};
use crate::engine::{Engine, ScriptModule};
use crate::executor::errors::{self, ErrorInfo};
use crate::executor::Val;
use crate::script_state;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// What a cat script sees as its argument
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatState {
    pub pos: Vec2,
    /// Seconds since the cat appeared, kept by the script
    pub time: f64,
}

script_state!(CatState as "CatState" { pos, time });

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Grown by `margin` on every side
    pub fn stretched(&self, margin: f64) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Edges count as inside
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Seeded RNG; the same seed replays the same scene
pub struct SceneRng {
    inner: ChaCha8Rng,
}

impl SceneRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Child RNG whose draws don't disturb this one
    #[must_use]
    pub fn fork(&mut self) -> Self {
        let seed = self.inner.next_u64();
        Self::new(seed)
    }

    /// Uniform in [0, 1)
    pub fn sample_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Uniform in [lo, hi)
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.sample_f64()
    }

    /// Uniform between `lo` and `hi`, both included, in either order
    pub fn between(&mut self, lo: u32, hi: u32) -> u32 {
        self.inner.gen_range(lo.min(hi)..=lo.max(hi))
    }
}

/// Install `DeltaTime()` and `Random()` on `engine`
pub fn register_bindings(engine: &Engine, dt: f64, rng: SceneRng) {
    engine.register_fn("DeltaTime", move |args| {
        expect_no_args("DeltaTime", args)?;
        Ok(Val::Num(dt))
    });

    let rng = Rc::new(RefCell::new(rng));
    engine.register_fn("Random", move |args| {
        expect_no_args("Random", args)?;
        Ok(Val::Num(rng.borrow_mut().sample_f64()))
    });
}

fn expect_no_args(name: &str, args: &[Val]) -> Result<(), ErrorInfo> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ErrorInfo::new(
            errors::WRONG_ARG_COUNT,
            format!("{} expects 0 arguments, got {}", name, args.len()),
        ))
    }
}

/// One frame's bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    /// Scene time at the start of the frame
    pub time: f64,
    pub spawned: usize,
    pub stepped: usize,
    pub removed: usize,
    pub population: usize,
}

pub struct Scene {
    pool: CoroutinePool<CatState>,
    rng: SceneRng,
    config: Config,
    bounds: Rect,
    elapsed: f64,
    next_spawn: f64,
    frame: u64,
}

impl Scene {
    /// Set up an empty scene; registers the cat bindings on the module's engine
    ///
    /// Fails if `config` does not validate.
    pub fn new(module: ScriptModule, config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let mut rng = SceneRng::new(config.seed);
        if let Some(engine) = module.engine() {
            register_bindings(engine, config.frames.dt, rng.fork());
        }

        let scene = &config.scene;
        Ok(Scene {
            pool: CoroutinePool::new(module),
            rng,
            config: config.clone(),
            bounds: Rect::new(0.0, 0.0, scene.width, scene.height).stretched(scene.margin),
            elapsed: 0.0,
            next_spawn: 0.0,
            frame: 0,
        })
    }

    /// Spawn what is due, step every cat, drop the ones that left
    pub fn frame(&mut self) -> FrameReport {
        let time = self.elapsed;
        self.frame += 1;

        let mut spawned = 0;
        while self.next_spawn <= time {
            spawned += self.spawn_batch();
            self.next_spawn += self.config.spawn.interval;
        }

        let bounds = self.bounds;
        let tick = self.pool.tick(|cat| bounds.contains(cat.pos));
        self.elapsed += self.config.frames.dt;

        FrameReport {
            frame: self.frame,
            time,
            spawned,
            stepped: tick.stepped,
            removed: tick.removed,
            population: tick.remaining,
        }
    }

    pub fn population(&self) -> usize {
        self.pool.len()
    }

    /// Snapshot of every live cat, in spawn order
    pub fn cats(&self) -> Vec<CatState> {
        self.pool
            .iter()
            .map(|cat| cat.borrow().state().clone())
            .collect()
    }

    fn spawn_batch(&mut self) -> usize {
        let spawn = &self.config.spawn;
        let count = self.rng.between(spawn.batch_min, spawn.batch_max);
        let y = self.config.scene.height + spawn.offset;

        for _ in 0..count {
            let x = self.rng.range(0.0, self.config.scene.width);
            let cat = CatState {
                pos: Vec2::new(x, y),
                time: 0.0,
            };
            self.pool.admit(&self.config.script.function, cat);
        }
        debug!(count, frame = self.frame, "spawned cats");
        count as usize
    }
}
