use crate::algorithms::actuator_map::{ActuatorMapper, DEFAULT_MAX_MAGNITUDE};
use crate::algorithms::pid::PidController;
use crate::messages::ui::TARGET_ENTRY_ID;
use crate::messages::{
    Actuation, ActuatorCommand, Gains, PlayerId, SpeedSample, SpeedUnits, TargetRegistration,
    UiDraw, VehicleEvent,
};
use cruise_core::error::{CruiseError, CruiseResult};
use cruise_core::{Hub, Node, NodeInfo, NodeState};
use std::time::Duration;

mod stores;

pub use stores::{SetpointStore, TelemetryCache};

/// Settings for one speed control loop
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedControlConfig {
    /// Vehicle whose speed is regulated
    pub target: PlayerId,
    pub gains: Gains,
    /// Controller output that maps to a full axis
    pub max_output: f64,
    /// Transport speed unit to internal unit
    pub telemetry_scale: f64,
    /// Nominal time between control ticks, used as the PID timestep
    pub control_period: Duration,
}

impl Default for SpeedControlConfig {
    fn default() -> Self {
        Self {
            target: PlayerId(2),
            gains: Gains::default(),
            max_output: DEFAULT_MAX_MAGNITUDE,
            telemetry_scale: 1.0,
            control_period: Duration::from_millis(50),
        }
    }
}

/// Speed Control Node - PID cruise control for one vehicle
///
/// Tracks the latest speed of the configured target and the operator's
/// setpoint. Every control tick runs the PID once and publishes exactly one
/// throttle/brake command on the actuation hub. The on-screen readouts are
/// published on the UI hub.
///
/// A controller exists only while a session is up: it is created on
/// `Connected` and dropped on `Disconnected`. Ticks outside a session emit
/// nothing. The setpoint survives reconnection, the telemetry does not.
pub struct SpeedControlNode {
    actuation: Hub<Actuation>,
    ui: Hub<UiDraw>,

    config: SpeedControlConfig,
    mapper: ActuatorMapper,
    dt: f64,

    setpoint: SetpointStore,
    telemetry: TelemetryCache,
    controller: Option<PidController>,
    sessions: u32,
}

impl SpeedControlNode {
    /// Create a speed control node with default topics
    pub fn new(config: SpeedControlConfig) -> CruiseResult<Self> {
        Self::new_with_hubs(config, "actuation", "ui")
    }

    /// Create a speed control node with custom topics
    pub fn new_with_hubs(
        config: SpeedControlConfig,
        actuation_topic: &str,
        ui_topic: &str,
    ) -> CruiseResult<Self> {
        let dt = config.control_period.as_secs_f64();
        if dt <= 0.0 {
            return Err(CruiseError::InvalidTimestep(dt));
        }
        if !config.gains.is_valid() {
            return Err(CruiseError::InvalidConfig(format!(
                "gains must be finite, got {:?}",
                config.gains
            )));
        }
        if !config.telemetry_scale.is_finite() {
            return Err(CruiseError::InvalidConfig(format!(
                "telemetry scale must be finite, got {}",
                config.telemetry_scale
            )));
        }
        let mapper = ActuatorMapper::new(config.max_output)?;

        Ok(Self {
            actuation: Hub::new(actuation_topic),
            ui: Hub::new(ui_topic),
            mapper,
            dt,
            setpoint: SetpointStore::default(),
            telemetry: TelemetryCache::new(config.target, config.telemetry_scale),
            controller: None,
            sessions: 0,
            config,
        })
    }

    pub fn actuation_hub(&self) -> &Hub<Actuation> {
        &self.actuation
    }

    pub fn ui_hub(&self) -> &Hub<UiDraw> {
        &self.ui
    }

    pub fn config(&self) -> &SpeedControlConfig {
        &self.config
    }

    pub fn setpoint_kmh(&self) -> i32 {
        self.setpoint.get()
    }

    /// Latest speed of the tracked target, internal units
    pub fn observed_speed(&self) -> f64 {
        self.telemetry.get()
    }

    /// Controller of the current session
    pub fn controller(&self) -> Option<&PidController> {
        self.controller.as_ref()
    }

    /// Whether a session is up and ticks produce commands
    pub fn is_engaged(&self) -> bool {
        self.controller.is_some()
    }

    /// Number of sessions started so far
    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    /// Start a session: fresh controller, stale telemetry, target setup and
    /// the button layout.
    pub fn on_connected(&mut self, ctx: &mut NodeInfo) -> CruiseResult<()> {
        self.controller = Some(PidController::new(self.config.gains));
        self.telemetry.reset();
        self.sessions += 1;
        ctx.set_state(NodeState::Running);

        let interval_ms = self.config.control_period.as_millis() as u64;
        self.publish_actuation(
            Actuation::Register(TargetRegistration::new(self.config.target, interval_ms)),
            ctx,
        );
        for draw in self.initial_layout() {
            self.publish_ui(draw, ctx);
        }

        ctx.log_info(&format!(
            "Session {} started, regulating {} at {} km/h",
            self.sessions,
            self.config.target,
            self.setpoint.get()
        ));
        Ok(())
    }

    pub fn initial_layout(&self) -> Vec<UiDraw> {
        UiDraw::initial_layout(self.setpoint.get())
    }

    pub fn on_telemetry(&mut self, samples: &[SpeedSample], ctx: &mut NodeInfo) -> CruiseResult<()> {
        for sample in samples {
            match self.telemetry.ingest(sample) {
                Ok(speed) => {
                    if self.is_engaged() {
                        let readout = UiDraw::speed_readout(Some(SpeedUnits::readout_kmh(speed)));
                        self.publish_ui(readout, ctx);
                    }
                }
                Err(CruiseError::UnknownTarget(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Setpoint entry. Unparseable text keeps the previous value and
    /// redraws nothing.
    pub fn on_text_submitted(
        &mut self,
        click_id: u8,
        text: &str,
        ctx: &mut NodeInfo,
    ) -> CruiseResult<()> {
        if click_id != TARGET_ENTRY_ID {
            ctx.log_debug(&format!("Ignoring text for button {}", click_id));
            return Ok(());
        }

        match self.setpoint.submit_text(text) {
            Ok(kmh) => {
                ctx.log_info(&format!("Target speed set to {} km/h", kmh));
                self.publish_ui(UiDraw::target_entry(kmh), ctx);
                Ok(())
            }
            Err(e) => {
                ctx.log_warning(&format!(
                    "{}; keeping {} km/h",
                    e,
                    self.setpoint.get()
                ));
                Ok(())
            }
        }
    }

    /// One control cycle.
    ///
    /// Returns the published command, or `None` when no session is up.
    /// A tick for any other target is `UnknownTarget`.
    pub fn on_control_tick(
        &mut self,
        target: PlayerId,
        ctx: &mut NodeInfo,
    ) -> CruiseResult<Option<ActuatorCommand>> {
        if target != self.config.target {
            return Err(CruiseError::UnknownTarget(target.0));
        }
        let Some(controller) = self.controller.as_mut() else {
            ctx.log_debug("Control tick outside a session, nothing to actuate");
            return Ok(None);
        };

        let setpoint = SpeedUnits::kmh_to_internal(self.setpoint.get() as f64);
        let measured = self.telemetry.get();
        let output = controller.compute(setpoint, measured, self.dt)?;

        let command = self.mapper.map(output, target);
        self.publish_actuation(Actuation::Command(command), ctx);
        Ok(Some(command))
    }

    /// End the session. Actuation stays off until the next `Connected`.
    pub fn on_disconnected(&mut self, ctx: &mut NodeInfo) {
        if self.controller.take().is_some() {
            ctx.log_info(&format!("Session {} ended, actuation stopped", self.sessions));
        }
        ctx.set_state(NodeState::Idle);
    }

    fn publish_actuation(&self, actuation: Actuation, ctx: &mut NodeInfo) {
        self.actuation.send(actuation);
        ctx.record_publish(self.actuation.topic());
    }

    fn publish_ui(&self, draw: UiDraw, ctx: &mut NodeInfo) {
        self.ui.send(draw);
        ctx.record_publish(self.ui.topic());
    }
}

impl Node for SpeedControlNode {
    type Event = VehicleEvent;

    fn name(&self) -> &'static str {
        "SpeedControlNode"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> CruiseResult<()> {
        let Gains { kp, ki, kd } = self.config.gains;
        ctx.log_info(&format!(
            "Speed control for {}: kp={} ki={} kd={} max_output={} dt={}s",
            self.config.target, kp, ki, kd, self.config.max_output, self.dt
        ));
        Ok(())
    }

    fn on_event(&mut self, event: VehicleEvent, ctx: &mut NodeInfo) -> CruiseResult<()> {
        match event {
            VehicleEvent::Connected { product, version } => {
                ctx.log_info(&format!("Connected to {} {}", product, version));
                self.on_connected(ctx)
            }
            VehicleEvent::PlayerJoined { target, name } => {
                if target == self.config.target {
                    ctx.log_info(&format!("Tracked player {} joined: {}", target, name));
                } else {
                    ctx.log_info(&format!("Player {} joined: {}", target, name));
                }
                Ok(())
            }
            VehicleEvent::Telemetry(samples) => self.on_telemetry(&samples, ctx),
            VehicleEvent::TextSubmitted { click_id, text } => {
                self.on_text_submitted(click_id, &text, ctx)
            }
            VehicleEvent::ControlTick { target } => match self.on_control_tick(target, ctx) {
                Ok(_) => Ok(()),
                Err(CruiseError::UnknownTarget(id)) => {
                    ctx.log_debug(&format!("Control tick for untracked target #{}", id));
                    Ok(())
                }
                Err(e) => Err(e),
            },
            VehicleEvent::Disconnected => {
                self.on_disconnected(ctx);
                Ok(())
            }
        }
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> CruiseResult<()> {
        self.controller = None;
        ctx.log_info(&format!(
            "Speed control stopped after {} session(s)",
            self.sessions
        ));
        Ok(())
    }
}
