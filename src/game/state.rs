//! Game state management - the simulation context, score and win/lose
//! conditions.
//!
//! [`Simulation`] owns the grid, the shooter and the projectile in flight.
//! Each [`Simulation::tick`] moves the projectile, attaches it on contact, runs
//! the match and sweep, and returns what happened as [`GameEvent`]s.
//!
//! Win: clear every level. Lose: lose a projectile, or let the grid reach the
//! shooter.

use bevy::prelude::*;

use super::{
    attach::attach,
    bubble::{Bubble, BubbleColor, ColorSpawner},
    cluster::check_and_remove_matches,
    config::{LevelConfig, LevelSet},
    error::ConfigError,
    grid::HexGrid,
    hex::HexCoord,
    projectile::{Contact, Playfield, Projectile},
    shooter::Shooter,
};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Score>();
    app.register_type::<GamePhase>();

    app.add_message::<FireProjectile>();
    app.add_message::<AimShooter>();
    app.add_message::<SetAimAngle>();
    app.add_message::<RestartGame>();
    app.add_message::<GameEvent>();

    app.add_systems(
        Update,
        (apply_input, advance_simulation)
            .chain()
            .in_set(SimulationSystems),
    );
}

/// Longest step a single tick may take, in seconds.
const MAX_TICK_DT: f32 = 0.033;

/// Initial grid cells closer than this many radii to a placed bubble are
/// left empty.
const INITIAL_SEPARATION: f32 = 1.98;

/// The game is lost once a bubble's bottom edge comes this close to the
/// shooter.
const SHOOTER_CLEARANCE: f32 = 20.0;

/// Systems that advance the simulation.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimulationSystems;

/// Fire the loaded bubble.
#[derive(Message, Debug, Clone, Copy)]
pub struct FireProjectile;

/// Point the shooter at a screen position.
#[derive(Message, Debug, Clone, Copy)]
pub struct AimShooter {
    pub target: Vec2,
}

/// Set the shooter's aim directly, in degrees (-90 is straight up).
#[derive(Message, Debug, Clone, Copy)]
pub struct SetAimAngle {
    pub degrees: f32,
}

/// Throw away the current game and start over at level 1.
#[derive(Message, Debug, Clone, Copy)]
pub struct RestartGame;

/// Something that happened during a tick.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The projectile became part of the grid.
    BubbleAttached { coord: HexCoord, color: BubbleColor },
    /// A same-color cluster popped.
    ClusterPopped { count: usize, points: u32 },
    /// Unsupported bubbles fell after a pop.
    BubblesDropped { count: usize, points: u32 },
    /// The projectile left the bottom of the playfield.
    BubbleLost,
    /// The grid grew down to the shooter.
    GridReachedShooter,
    /// Every bubble of this level was cleared.
    LevelCleared { level: usize },
    /// The last level was cleared.
    Victory,
}

impl GameEvent {
    /// Whether this event finishes the game.
    pub fn ends_game(&self) -> bool {
        matches!(
            self,
            GameEvent::BubbleLost | GameEvent::GridReachedShooter | GameEvent::Victory
        )
    }
}

/// Where the game currently stands.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum GamePhase {
    #[default]
    Playing,
    GameOver,
    Victory,
}

/// Running score for the current game.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct Score {
    pub score: u32,
    pub bubbles_popped: u32,
    pub clusters_popped: u32,
}

impl Score {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// An attached bubble as a renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleView {
    pub position: Vec2,
    pub color: BubbleColor,
    pub radius: f32,
}

/// The whole simulation: levels, grid, shooter, projectile and score.
///
/// Only [`Simulation::tick`], [`Simulation::fire`] and the level controls
/// mutate it. Everything else is read between ticks.
#[derive(Resource, Debug, Clone)]
pub struct Simulation {
    levels: LevelSet,
    level: LevelConfig,
    grid: HexGrid,
    shooter: Shooter,
    projectile: Option<Projectile>,
    spawner: ColorSpawner,
    score: Score,
    phase: GamePhase,
}

impl Simulation {
    /// Validate `levels` and start level 1 with OS-seeded colors.
    pub fn new(levels: LevelSet) -> Result<Self, ConfigError> {
        Self::with_spawner(levels, ColorSpawner::from_entropy())
    }

    /// Like [`Simulation::new`], with reproducible colors.
    pub fn with_seed(levels: LevelSet, seed: u64) -> Result<Self, ConfigError> {
        Self::with_spawner(levels, ColorSpawner::from_seed(seed))
    }

    fn with_spawner(levels: LevelSet, mut spawner: ColorSpawner) -> Result<Self, ConfigError> {
        levels.validate()?;
        let level = levels.level(1).ok_or(ConfigError::NoLevels)?;
        let grid = build_grid(&level, &mut spawner);
        let shooter = load_shooter(&level, &mut spawner);

        Ok(Self {
            levels,
            level,
            grid,
            shooter,
            projectile: None,
            spawner,
            score: Score::default(),
            phase: GamePhase::Playing,
        })
    }

    /// Discard the grid and projectile and build level `number` (clamped to
    /// the available levels). The score carries over.
    pub fn start_level(&mut self, number: usize) {
        let Some(level) = self.levels.level(number) else {
            warn!("No level {} to start", number);
            return;
        };
        self.grid = build_grid(&level, &mut self.spawner);
        self.shooter = load_shooter(&level, &mut self.spawner);
        self.level = level;
        self.projectile = None;
        self.phase = GamePhase::Playing;
    }

    /// Start a fresh game at level 1.
    pub fn restart(&mut self) {
        info!("Restarting game");
        self.score.reset();
        self.start_level(1);
    }

    pub fn aim_at(&mut self, target: Vec2) {
        self.shooter.aim_at(target);
    }

    /// Aim by angle, clamped to the firing arc.
    pub fn set_aim(&mut self, degrees: f32) {
        self.shooter.set_angle(degrees);
    }

    /// Launch the loaded bubble.
    ///
    /// Returns false while another projectile is in flight or the game is
    /// over.
    pub fn fire(&mut self) -> bool {
        if self.phase != GamePhase::Playing || self.projectile.is_some() {
            return false;
        }
        let next = self.spawner.next_color(&self.level.colors);
        let projectile = self.shooter.fire(self.level.bubble_speed, next);
        debug!(
            "Fired {:?} bubble at {:.1} degrees",
            projectile.color,
            self.shooter.angle()
        );
        self.projectile = Some(projectile);
        true
    }

    /// Advance the projectile by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::Playing {
            return events;
        }
        let Some(mut projectile) = self.projectile.take() else {
            return events;
        };

        let dt = dt.clamp(0.0, MAX_TICK_DT);
        match projectile.step(&self.grid, self.playfield(), dt) {
            Some(Contact::Ceiling | Contact::Bubble) => self.land(projectile, &mut events),
            Some(Contact::OutOfBounds) => {
                info!("GAME OVER! Bubble lost. Final score: {}", self.score.score);
                self.phase = GamePhase::GameOver;
                events.push(GameEvent::BubbleLost);
            }
            Some(Contact::Wall) | None => self.projectile = Some(projectile),
        }
        events
    }

    /// Attach a stopped projectile, then score, then check for the end of the
    /// level or the game.
    fn land(&mut self, projectile: Projectile, events: &mut Vec<GameEvent>) {
        let color = projectile.color;
        let attachment = attach(&mut self.grid, projectile.into_bubble());
        events.push(GameEvent::BubbleAttached {
            coord: attachment.coord,
            color,
        });

        let outcome = check_and_remove_matches(&mut self.grid, attachment.coord);
        if let Some(popped) = &outcome.popped {
            let points = popped.points();
            self.score.score += points;
            self.score.bubbles_popped += popped.count as u32;
            self.score.clusters_popped += 1;
            info!(
                "Cluster popped: {} {:?} bubbles, +{} points (total: {})",
                popped.count, popped.color, points, self.score.score
            );
            events.push(GameEvent::ClusterPopped {
                count: popped.count,
                points,
            });
        }
        if let Some(dropped) = &outcome.dropped {
            let points = dropped.points();
            self.score.score += points;
            self.score.bubbles_popped += dropped.count as u32;
            info!(
                "Floating bubbles removed: {}, +{} points (total: {})",
                dropped.count, points, self.score.score
            );
            events.push(GameEvent::BubblesDropped {
                count: dropped.count,
                points,
            });
        }

        if self.grid.is_empty() {
            self.finish_level(events);
        } else if self.grid_reached_shooter() {
            info!(
                "GAME OVER! Bubbles reached the shooter. Final score: {}",
                self.score.score
            );
            self.phase = GamePhase::GameOver;
            events.push(GameEvent::GridReachedShooter);
        }
    }

    fn finish_level(&mut self, events: &mut Vec<GameEvent>) {
        let level = self.level.number;
        info!("Level {} cleared! Score: {}", level, self.score.score);
        events.push(GameEvent::LevelCleared { level });

        if level < self.levels.len() {
            self.start_level(level + 1);
        } else {
            info!("WIN! All levels cleared! Final score: {}", self.score.score);
            self.phase = GamePhase::Victory;
            events.push(GameEvent::Victory);
        }
    }

    fn grid_reached_shooter(&self) -> bool {
        let limit = self.shooter.base.y - SHOOTER_CLEARANCE;
        self.grid.lowest_edge().is_some_and(|edge| edge >= limit)
    }

    fn playfield(&self) -> Playfield {
        Playfield {
            width: self.level.settings.playfield_width,
            height: self.level.settings.playfield_height,
        }
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn shooter(&self) -> &Shooter {
        &self.shooter
    }

    pub fn projectile(&self) -> Option<&Projectile> {
        self.projectile.as_ref()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Every attached bubble, in creation order.
    pub fn attached_bubbles(&self) -> impl Iterator<Item = BubbleView> + '_ {
        let radius = self.level.radius();
        self.grid.iter().map(move |(_, bubble)| BubbleView {
            position: bubble.position,
            color: bubble.color,
            radius,
        })
    }
}

/// Fill a level's starting rows with random colors.
fn build_grid(level: &LevelConfig, spawner: &mut ColorSpawner) -> HexGrid {
    let mut grid = HexGrid::new(level.layout(), level.rows, level.cols);
    let min_separation = level.radius() * INITIAL_SEPARATION;

    for row in 0..level.rows {
        for col in 0..level.cols {
            let coord = HexCoord::new(row, col);
            let color = spawner.next_color(&level.colors);
            let position = grid.cell_to_pixel(coord);
            if !grid.has_clearance(position, min_separation) {
                debug!("Skipping crowded cell {}", coord);
                continue;
            }
            if grid.place(Bubble::moving(color, position, Vec2::ZERO), coord).is_err() {
                warn!("Initial cell {} already taken", coord);
            }
        }
    }

    info!(
        "Level {}: {}x{} grid with {} bubbles",
        level.number,
        level.rows,
        level.cols,
        grid.len()
    );
    grid
}

fn load_shooter(level: &LevelConfig, spawner: &mut ColorSpawner) -> Shooter {
    let loaded = spawner.next_color(&level.colors);
    let on_deck = spawner.next_color(&level.colors);
    Shooter::new(level.shooter_base(), loaded, on_deck)
}

/// Apply player input: restart, aim, then fire.
fn apply_input(
    mut simulation: ResMut<Simulation>,
    mut restart: MessageReader<RestartGame>,
    mut aim: MessageReader<AimShooter>,
    mut aim_angle: MessageReader<SetAimAngle>,
    mut fire: MessageReader<FireProjectile>,
) {
    if restart.read().last().is_some() {
        simulation.restart();
    }
    if let Some(aim) = aim.read().last() {
        simulation.aim_at(aim.target);
    }
    if let Some(aim) = aim_angle.read().last() {
        simulation.set_aim(aim.degrees);
    }
    for _ in fire.read() {
        simulation.fire();
    }
}

/// Tick the simulation and publish what happened.
fn advance_simulation(
    time: Res<Time>,
    mut simulation: ResMut<Simulation>,
    mut events: MessageWriter<GameEvent>,
) {
    for event in simulation.tick(time.delta_secs()) {
        events.write(event);
    }
}
