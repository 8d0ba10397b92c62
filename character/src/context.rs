/*!
Seams between the turn-in-place component and its host.

The component never owns a character, a controller, or an animation evaluator.
It reads them through [`TurnContext`] and [`AnimationTurnSource`] and writes
rotation back through the same context. Hosts implement these once per
character; the component caches the binding result rather than re-probing the
animation capability every tick.
*/

use shared::{
    ClipId, CurveValues, MontageId, Orientation, STATIONARY_SPEED_EPS, TurnAnimSet, TurnOverride,
    TurnSettings, Vec3,
};

/// Network role of the local copy of a character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NetRole {
    /// Owns the canonical simulation state.
    #[default]
    Authority,
    /// Predicts its own movement ahead of confirmation.
    AutonomousProxy,
    /// Receives and extrapolates replicated state only.
    SimulatedProxy,
}

/// Network mode of the running process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NetMode {
    /// No networking; nothing is replicated.
    #[default]
    Standalone,
    Client,
    ListenServer,
    DedicatedServer,
}

/// Rotation flags of the host's movement setup. Static for the lifetime of a
/// movement configuration; the turn method is derived from them, not stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RotationConfig {
    pub use_controller_rotation_pitch: bool,
    pub use_controller_rotation_yaw: bool,
    pub use_controller_rotation_roll: bool,
    pub orient_rotation_to_movement: bool,
    pub use_controller_desired_rotation: bool,
    /// Keep rotating from desired-rotation sources even without a controller.
    pub run_physics_with_no_controller: bool,
}

impl RotationConfig {
    /// Character faces its movement direction.
    pub fn orient_to_movement() -> Self {
        Self {
            orient_rotation_to_movement: true,
            ..Self::default()
        }
    }

    /// Character smoothly rotates toward the controller's desired rotation.
    pub fn strafe_desired() -> Self {
        Self {
            use_controller_desired_rotation: true,
            ..Self::default()
        }
    }

    /// Character snaps its yaw to the control rotation.
    pub fn strafe_direct() -> Self {
        Self {
            use_controller_rotation_yaw: true,
            ..Self::default()
        }
    }
}

/// Which of the two rotation-update call sites owns this character's turning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnMethod {
    /// Instant path: yaw snaps to control rotation each tick.
    FaceRotation,
    /// Interpolated path: yaw eases toward a desired rotation.
    PhysicsRotation,
}

/// Derives the turn method from the movement rotation flags.
///
/// Controller-driven rotation without orient-to-movement is the instant path;
/// everything else goes through the interpolated path.
pub fn turn_method(config: &RotationConfig) -> TurnMethod {
    if !config.orient_rotation_to_movement
        && (config.use_controller_rotation_pitch
            || config.use_controller_rotation_yaw
            || config.use_controller_rotation_roll)
    {
        return TurnMethod::FaceRotation;
    }
    TurnMethod::PhysicsRotation
}

/// A root-motion montage currently driving the character, as much of it as
/// the montage-exclusion rules need to see.
#[derive(Clone, Debug, PartialEq)]
pub struct MontageInfo {
    pub id: MontageId,
    pub is_additive: bool,
    /// Animation-track slot names the montage plays into.
    pub slots: Vec<String>,
}

/// Animation evaluator capability consumed by the turn system.
///
/// `anim_set` and `curve_values` must be thread safe: the animation graph may
/// call them from a worker while other characters tick.
pub trait AnimationTurnSource {
    /// The active anim set, including its turn parameters.
    fn anim_set(&self) -> TurnAnimSet;

    /// Current values of the named turn curves.
    fn curve_values(&self, settings: &TurnSettings) -> CurveValues;

    /// The networked root-motion montage currently playing, if any.
    fn current_root_motion_montage(&self) -> Option<MontageInfo>;

    /// Samples a named curve of a specific clip at a playback time. Used by
    /// the pseudo animation state when no mesh is being ticked.
    fn evaluate_clip_curve(&self, clip: ClipId, curve_name: &str, time: f32) -> f32;

    /// Duration of a clip in seconds.
    fn clip_play_length(&self, clip: ClipId) -> f32;

    /// The clip's own authored playback rate.
    fn clip_rate_scale(&self, clip: ClipId) -> f32;
}

/// The host character as the turn component sees it.
pub trait TurnContext {
    fn velocity(&self) -> Vec3;

    /// Current simulated rotation of the character.
    fn actor_rotation(&self) -> Orientation;

    /// Writes the character's simulated rotation. `sweep` asks the host to
    /// perform a collision sweep for the change.
    fn set_actor_rotation(&mut self, rotation: Orientation, sweep: bool);

    fn local_role(&self) -> NetRole;

    fn net_mode(&self) -> NetMode;

    fn rotation_config(&self) -> RotationConfig;

    /// The controller's desired rotation; `None` when there is no controller.
    fn desired_controller_rotation(&self) -> Option<Orientation>;

    /// Desired rotation from a controller found through the owner chain, for
    /// hosts that run rotation physics without a possessing controller.
    fn fallback_controller_rotation(&self) -> Option<Orientation> {
        None
    }

    /// Debug configuration forcing an enabled state, if any.
    fn debug_override(&self) -> TurnOverride {
        TurnOverride::Default
    }

    /// The bound animation evaluator, if one exists and is compatible.
    fn animation(&self) -> Option<&dyn AnimationTurnSource>;

    fn has_authority(&self) -> bool {
        self.local_role() == NetRole::Authority
    }

    fn is_stationary(&self) -> bool {
        self.velocity().norm_squared() <= STATIONARY_SPEED_EPS * STATIONARY_SPEED_EPS
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use shared::TurnParams;

    /// Scripted animation evaluator. Curve feedback is whatever the test put
    /// in `curves`; clip evaluation models a turn clip whose remaining yaw
    /// runs linearly to zero with the weight dropping at the recovery point.
    pub struct MockAnimation {
        pub anim_set: TurnAnimSet,
        pub curves: CurveValues,
        pub montage: Option<MontageInfo>,
        pub clip_length: f32,
        pub clip_rate_scale: f32,
        pub clip_start_yaw: f32,
        pub recovery_fraction: f32,
    }

    impl Default for MockAnimation {
        fn default() -> Self {
            Self {
                anim_set: TurnAnimSet::default(),
                curves: CurveValues::ZERO,
                montage: None,
                clip_length: 1.0,
                clip_rate_scale: 1.0,
                clip_start_yaw: -90.0,
                recovery_fraction: 0.8,
            }
        }
    }

    impl AnimationTurnSource for MockAnimation {
        fn anim_set(&self) -> TurnAnimSet {
            self.anim_set.clone()
        }

        fn curve_values(&self, _settings: &TurnSettings) -> CurveValues {
            self.curves
        }

        fn current_root_motion_montage(&self) -> Option<MontageInfo> {
            self.montage.clone()
        }

        fn evaluate_clip_curve(&self, _clip: ClipId, curve_name: &str, time: f32) -> f32 {
            let settings = TurnSettings::default();
            let t = (time / self.clip_length).clamp(0.0, 1.0);
            if curve_name == settings.turn_weight_curve_name {
                if t < self.recovery_fraction { 1.0 } else { 0.0 }
            } else {
                self.clip_start_yaw * (1.0 - t)
            }
        }

        fn clip_play_length(&self, _clip: ClipId) -> f32 {
            self.clip_length
        }

        fn clip_rate_scale(&self, _clip: ClipId) -> f32 {
            self.clip_rate_scale
        }
    }

    pub struct MockContext {
        pub velocity: Vec3,
        pub rotation: Orientation,
        pub role: NetRole,
        pub net_mode: NetMode,
        pub config: RotationConfig,
        pub desired_rotation: Option<Orientation>,
        pub fallback_rotation: Option<Orientation>,
        pub debug_override: TurnOverride,
        pub animation: Option<MockAnimation>,
        pub rotation_writes: usize,
        pub last_sweep: Option<bool>,
    }

    impl MockContext {
        /// Stationary standalone authority with a bound animation source and
        /// direct controller-yaw rotation (the instant path).
        pub fn stationary() -> Self {
            Self {
                velocity: Vec3::zeros(),
                rotation: Orientation::ZERO,
                role: NetRole::Authority,
                net_mode: NetMode::Standalone,
                config: RotationConfig::strafe_direct(),
                desired_rotation: None,
                fallback_rotation: None,
                debug_override: TurnOverride::Default,
                animation: Some(MockAnimation::default()),
                rotation_writes: 0,
                last_sweep: None,
            }
        }

        pub fn anim_mut(&mut self) -> &mut MockAnimation {
            self.animation.as_mut().unwrap()
        }

        pub fn params_mut(&mut self) -> &mut TurnParams {
            &mut self.anim_mut().anim_set.params
        }
    }

    impl TurnContext for MockContext {
        fn velocity(&self) -> Vec3 {
            self.velocity
        }

        fn actor_rotation(&self) -> Orientation {
            self.rotation
        }

        fn set_actor_rotation(&mut self, rotation: Orientation, sweep: bool) {
            self.rotation = rotation;
            self.rotation_writes += 1;
            self.last_sweep = Some(sweep);
        }

        fn local_role(&self) -> NetRole {
            self.role
        }

        fn net_mode(&self) -> NetMode {
            self.net_mode
        }

        fn rotation_config(&self) -> RotationConfig {
            self.config
        }

        fn desired_controller_rotation(&self) -> Option<Orientation> {
            self.desired_rotation
        }

        fn fallback_controller_rotation(&self) -> Option<Orientation> {
            self.fallback_rotation
        }

        fn debug_override(&self) -> TurnOverride {
            self.debug_override
        }

        fn animation(&self) -> Option<&dyn AnimationTurnSource> {
            self.animation
                .as_ref()
                .map(|anim| anim as &dyn AnimationTurnSource)
        }
    }
}
