//! Device assembly for one controller
//!
//! The bridge instantiates one component per configured device assigned to
//! its controller, starts them, routes pin reports to the sensor that owns
//! the pin and dispatches commands to actuators by device name.
//!
//! Reports no sensor claims are recorded in the shared [`PinValueService`],
//! which the bridge borrows so that on-demand reads can wait on it while the
//! bridge keeps routing.

use embassy_time::Instant;
use heapless::Vec;
use pinbridge_core::config::{
    label, BoardProfile, BridgeConfig, Label, MAX_DISTANCE_SENSORS, MAX_ENCODERS,
    MAX_INTENSITY_SENSORS, MAX_KEYPADS, MAX_LEDS, MAX_MOTORS, MAX_OLEDS, MAX_SERVOS,
};
use pinbridge_core::{log_info, log_warn, MaxFrequency, Reading, Sink};
use pinbridge_display::{DisplayError, GrayImage, Ssd1306};
use pinbridge_hal::{Board, PinReport, PinResolver};

use crate::actuator::{Led, Servo};
use crate::motor::Motor;
use crate::pins::PinValueService;
use crate::sensor::{
    AnalogIntensitySensor, DigitalIntensitySensor, DistanceSensor, EncoderSensor, KeypadSensor,
    Sensor,
};

/// Upper bound on sensor monitors; an intensity sensor may need two
pub const MAX_SENSORS: usize =
    MAX_DISTANCE_SENSORS + 2 * MAX_INTENSITY_SENSORS + MAX_KEYPADS + MAX_ENCODERS;

/// Bridge errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// More devices of one kind than the bridge can hold
    TooManyDevices,
    /// No device with the given name on this controller
    UnknownDevice,
    /// Display operation failed
    Display(DisplayError),
}

impl From<DisplayError> for BridgeError {
    fn from(e: DisplayError) -> Self {
        BridgeError::Display(e)
    }
}

/// What to put on a display
#[derive(Debug, Clone, Copy)]
pub enum DisplayContent<'a> {
    /// Wrapped text
    Text(&'a str),
    /// One grayscale image
    Image(GrayImage<'a>),
    /// Grayscale frames shown in order
    Animation(&'a [GrayImage<'a>]),
}

/// Board scan interval matching a publish rate
///
/// Rates of 1 Hz and below scan as fast as unthrottled ones.
pub fn scan_interval_ms(max_frequency: MaxFrequency) -> u8 {
    match max_frequency {
        MaxFrequency::Hz(hz) if hz > 1 => (1000 / hz as u32).clamp(1, u8::MAX as u32) as u8,
        _ => 1,
    }
}

/// All devices of one controller
pub struct Bridge<'a, B, R> {
    board: &'a B,
    pins: &'a PinValueService<R>,
    max_frequency: MaxFrequency,
    sensors: Vec<Sensor, MAX_SENSORS>,
    motors: Vec<(Label, Motor), MAX_MOTORS>,
    servos: Vec<Servo, MAX_SERVOS>,
    leds: Vec<Led, MAX_LEDS>,
    oleds: Vec<(Label, Ssd1306), MAX_OLEDS>,
}

impl<'a, B: Board, R: PinResolver> Bridge<'a, B, R> {
    /// Build the devices of `config` assigned to `controller`
    pub fn new(
        board: &'a B,
        pins: &'a PinValueService<R>,
        config: &BridgeConfig,
        profile: &BoardProfile,
        controller: &str,
    ) -> Result<Self, BridgeError> {
        let mut bridge = Self {
            board,
            pins,
            max_frequency: config.max_frequency,
            sensors: Vec::new(),
            motors: Vec::new(),
            servos: Vec::new(),
            leds: Vec::new(),
            oleds: Vec::new(),
        };
        let ours = |name: &str| name == controller;
        let max_frequency = config.max_frequency;

        for distance in config.distance.iter().filter(|c| ours(c.controller.as_str())) {
            bridge.add_sensor(Sensor::Distance(DistanceSensor::new(distance, max_frequency)))?;
        }

        for intensity in config.intensity.iter().filter(|c| ours(c.controller.as_str())) {
            if intensity.analog.is_none() && intensity.digital.is_none() {
                log_warn!("intensity {}: no pins configured", intensity.name.as_str());
            }
            if let Some(pin) = intensity.analog {
                bridge.add_sensor(Sensor::Intensity(AnalogIntensitySensor::new(
                    &intensity.name,
                    pin,
                    intensity.differential,
                    profile,
                    max_frequency,
                )))?;
            }
            if let Some(pin) = intensity.digital {
                bridge.add_sensor(Sensor::IntensityDigital(DigitalIntensitySensor::new(
                    &intensity.name,
                    pin,
                    max_frequency,
                )))?;
            }
        }

        for keypad in config.keypads.iter().filter(|c| ours(c.controller.as_str())) {
            bridge.add_sensor(Sensor::Keypad(KeypadSensor::new(keypad, profile, max_frequency)))?;
        }

        for encoder in config.encoders.iter().filter(|c| ours(c.controller.as_str())) {
            bridge.add_sensor(Sensor::Encoder(EncoderSensor::new(encoder)))?;
        }

        for motor in config.motors.iter().filter(|c| ours(c.controller.as_str())) {
            let entry = (label(&motor.name), Motor::new(motor.kind, profile.max_pwm));
            bridge
                .motors
                .push(entry)
                .map_err(|_| BridgeError::TooManyDevices)?;
        }

        for servo in config.servos.iter().filter(|c| ours(c.controller.as_str())) {
            bridge
                .servos
                .push(Servo::new(servo))
                .map_err(|_| BridgeError::TooManyDevices)?;
        }

        for led in config.leds.iter().filter(|c| ours(c.controller.as_str())) {
            bridge
                .leds
                .push(Led::new(led, profile))
                .map_err(|_| BridgeError::TooManyDevices)?;
        }

        for oled in config.oleds.iter().filter(|c| ours(c.controller.as_str())) {
            let display = Ssd1306::new(
                oled.width,
                oled.height,
                oled.port,
                oled.address,
                oled.i2c_pins(),
            )?;
            bridge
                .oleds
                .push((label(&oled.name), display))
                .map_err(|_| BridgeError::TooManyDevices)?;
        }

        log_info!(
            "bridge {}: {} sensors, {} motors, {} servos, {} leds, {} displays",
            controller,
            bridge.sensors.len(),
            bridge.motors.len(),
            bridge.servos.len(),
            bridge.leds.len(),
            bridge.oleds.len()
        );
        Ok(bridge)
    }

    fn add_sensor(&mut self, sensor: Sensor) -> Result<(), BridgeError> {
        self.sensors
            .push(sensor)
            .map_err(|_| BridgeError::TooManyDevices)
    }

    /// Configure the board and every device
    ///
    /// A display that fails to start stays disabled; the other devices are
    /// unaffected.
    pub async fn start(&mut self) {
        let interval = scan_interval_ms(self.max_frequency);
        if self.board.set_scan_interval(interval).await.is_failure() {
            log_warn!("bridge: scan interval {} rejected", interval);
        }

        for sensor in self.sensors.iter() {
            sensor.start(self.board).await;
        }
        for led in self.leds.iter() {
            led.start(self.board).await;
        }
        for servo in self.servos.iter() {
            servo.start(self.board).await;
        }
        for (name, oled) in self.oleds.iter_mut() {
            if oled.start(self.board).await.is_err() {
                log_warn!("oled {}: start failed", name.as_str());
            }
        }
    }

    /// Release actuators that hold their pins
    pub async fn stop(&self) {
        for servo in self.servos.iter() {
            servo.stop(self.board).await;
        }
    }

    /// Hand a pin report to the sensor that owns the pin
    ///
    /// Returns false if no sensor claimed it; the value is then recorded for
    /// on-demand reads.
    pub fn route<S: Sink>(&mut self, report: &PinReport, sink: &mut S) -> bool {
        match self.sensors.iter_mut().find(|sensor| sensor.accepts(report)) {
            Some(sensor) => {
                sensor.handle(report, sink);
                true
            }
            None => {
                self.pins.record(report);
                false
            }
        }
    }

    /// Publish and reset every encoder's speed count
    pub fn publish_encoder_speeds<S: Sink>(&mut self, now: Instant, sink: &mut S) {
        for sensor in self.sensors.iter_mut() {
            if let Sensor::Encoder(encoder) = sensor {
                encoder.publish_speed(now, sink);
            }
        }
    }

    /// Last published reading of the sensor called `name`
    ///
    /// The digital half of an intensity sensor is queried separately with
    /// [`last_digital_reading`](Self::last_digital_reading).
    pub fn last_reading(&self, name: &str) -> Option<Reading> {
        self.sensors
            .iter()
            .filter(|sensor| !matches!(sensor, Sensor::IntensityDigital(_)))
            .find(|sensor| sensor.name() == name)
            .and_then(Sensor::last_reading)
    }

    /// Last published reading of the digital intensity sensor called `name`
    pub fn last_digital_reading(&self, name: &str) -> Option<Reading> {
        self.sensors
            .iter()
            .find(|sensor| matches!(sensor, Sensor::IntensityDigital(s) if s.name() == name))
            .and_then(Sensor::last_reading)
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn pins(&self) -> &'a PinValueService<R> {
        self.pins
    }

    pub async fn set_motor_speed(&mut self, name: &str, speed: i32) -> Result<(), BridgeError> {
        let (_, motor) = self
            .motors
            .iter_mut()
            .find(|(motor, _)| motor.as_str() == name)
            .ok_or(BridgeError::UnknownDevice)?;
        motor.set_speed(self.board, speed).await;
        Ok(())
    }

    pub async fn set_servo_angle(&self, name: &str, angle: u16) -> Result<(), BridgeError> {
        let servo = self
            .servos
            .iter()
            .find(|servo| servo.name() == name)
            .ok_or(BridgeError::UnknownDevice)?;
        servo.set_angle(self.board, angle).await;
        Ok(())
    }

    pub async fn set_led_value(&self, name: &str, percent: u32) -> Result<(), BridgeError> {
        let led = self
            .leds
            .iter()
            .find(|led| led.name() == name)
            .ok_or(BridgeError::UnknownDevice)?;
        led.set_value(self.board, percent).await;
        Ok(())
    }

    /// Show text, an image or an animation on a display
    pub async fn display(&mut self, name: &str, content: DisplayContent<'_>) -> Result<(), BridgeError> {
        let (_, oled) = self
            .oleds
            .iter_mut()
            .find(|(oled, _)| oled.as_str() == name)
            .ok_or(BridgeError::UnknownDevice)?;

        match content {
            DisplayContent::Text(text) => oled.show_text(self.board, text).await?,
            DisplayContent::Image(image) => oled.show_image(self.board, &image).await?,
            DisplayContent::Animation(frames) => {
                oled.play_animation(self.board, frames.iter().copied()).await?
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::test_util::YieldDelay;
    use crate::pins::PinKind;
    use crate::sensor::test_util::{ms, Collect};
    use embassy_futures::block_on;
    use pinbridge_core::config::{
        DistanceConfig, EncoderConfig, IntensityConfig, LedConfig, MotorConfig, MotorKind,
        OledConfig, ServoConfig,
    };
    use pinbridge_hal::mock::{MockBoard, Op};
    use pinbridge_hal::{PinMode, RawPins, ReportKind};

    const CONTROLLER: &str = "mirte";

    fn config() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        let ours = label(CONTROLLER);

        config
            .distance
            .push(DistanceConfig {
                name: label("front"),
                controller: ours.clone(),
                trigger: 8,
                echo: 9,
            })
            .unwrap();
        config
            .distance
            .push(DistanceConfig {
                name: label("rear"),
                controller: label("other"),
                trigger: 10,
                echo: 11,
            })
            .unwrap();
        config
            .intensity
            .push(IntensityConfig {
                name: label("line"),
                controller: ours.clone(),
                analog: Some(28),
                digital: Some(3),
                differential: 0,
            })
            .unwrap();
        config
            .encoders
            .push(EncoderConfig {
                name: label("left"),
                controller: ours.clone(),
                pin: 16,
                ..EncoderConfig::default()
            })
            .unwrap();
        config
            .motors
            .push(MotorConfig {
                name: label("left"),
                controller: ours.clone(),
                kind: MotorKind::Ddp { p1: 20, d1: 21, d2: 22 },
            })
            .unwrap();
        config
            .servos
            .push(ServoConfig {
                name: label("arm"),
                controller: ours.clone(),
                pin: 12,
                ..ServoConfig::default()
            })
            .unwrap();
        config
            .leds
            .push(LedConfig {
                name: label("status"),
                controller: ours.clone(),
                pin: 25,
            })
            .unwrap();
        config
            .oleds
            .push(OledConfig {
                name: label("screen"),
                controller: ours,
                ..OledConfig::default()
            })
            .unwrap();
        config
    }

    fn profile() -> BoardProfile {
        BoardProfile {
            analog_offset: 26,
            ..BoardProfile::default()
        }
    }

    #[test]
    fn test_filters_by_controller() {
        let board = MockBoard::new();
        let pins = PinValueService::new(RawPins, profile());
        let bridge = Bridge::new(&board, &pins, &config(), &profile(), CONTROLLER).unwrap();

        let names: std::vec::Vec<&str> = bridge.sensors().iter().map(Sensor::name).collect();
        assert_eq!(names, ["front", "line", "line", "left"]);
        assert!(matches!(bridge.sensors()[1], Sensor::Intensity(_)));
        assert!(matches!(bridge.sensors()[2], Sensor::IntensityDigital(_)));
    }

    #[test]
    fn test_start_order() {
        let board = MockBoard::new();
        let pins = PinValueService::new(RawPins, profile());
        let mut bridge = Bridge::new(&board, &pins, &config(), &profile(), CONTROLLER).unwrap();

        block_on(bridge.start());

        let ops = board.ops();
        assert_eq!(ops[0], Op::ScanInterval(33));
        assert_eq!(ops[1], Op::Mode(8, PinMode::Sonar { echo: 9 }));
        assert_eq!(ops[2], Op::Mode(2, PinMode::AnalogInput { differential: 0 }));
        assert_eq!(ops[3], Op::Mode(3, PinMode::DigitalInput));
        assert!(matches!(ops[4], Op::Mode(16, PinMode::Encoder { .. })));
        assert_eq!(ops[5], Op::Mode(25, PinMode::PwmOutput));
        assert!(matches!(ops[6], Op::Mode(12, PinMode::Servo { .. })));
        assert_eq!(ops[7], Op::EnableI2c(0, None));
        // Motors are configured lazily
        assert!(!ops.iter().any(|op| matches!(op, Op::Mode(20..=22, _))));
    }

    #[test]
    fn test_route_to_sensor_or_pin_table() {
        let board = MockBoard::new();
        let pins = PinValueService::new(RawPins, profile());
        let mut bridge = Bridge::new(&board, &pins, &config(), &profile(), CONTROLLER).unwrap();
        let mut sink = Collect::default();

        let sonar = PinReport::new(ReportKind::Sonar, 8, 30, ms(0));
        assert!(bridge.route(&sonar, &mut sink));
        assert_eq!(sink.readings.len(), 1);
        assert!(bridge.last_reading("front").is_some());

        let stray = PinReport::new(ReportKind::Analog, 4, 77, ms(0));
        assert!(!bridge.route(&stray, &mut sink));
        assert_eq!(pins.value(30), Some(77));

        let mut delay = YieldDelay::default();
        let value = block_on(pins.get_pin_value(&board, &mut delay, "30", PinKind::Analog));
        assert_eq!(value, 77);
    }

    #[test]
    fn test_dual_intensity_readings_queried_separately() {
        let board = MockBoard::new();
        let pins = PinValueService::new(RawPins, profile());
        let mut bridge = Bridge::new(&board, &pins, &config(), &profile(), CONTROLLER).unwrap();
        let mut sink = Collect::default();

        bridge.route(&PinReport::new(ReportKind::Digital, 3, 1, ms(0)), &mut sink);
        assert_eq!(sink.readings[0].0, "line");
        assert_eq!(
            bridge.last_digital_reading("line"),
            Some(Reading::IntensityDigital(true))
        );
        assert_eq!(bridge.last_reading("line"), None);

        bridge.route(&PinReport::new(ReportKind::Analog, 2, 600, ms(0)), &mut sink);
        assert_eq!(bridge.last_reading("line"), Some(Reading::Intensity(600)));
        assert_eq!(
            bridge.last_digital_reading("line"),
            Some(Reading::IntensityDigital(true))
        );
        assert_eq!(bridge.last_digital_reading("front"), None);
    }

    #[test]
    fn test_encoder_speed_publication() {
        let board = MockBoard::new();
        let pins = PinValueService::new(RawPins, profile());
        let mut bridge = Bridge::new(&board, &pins, &config(), &profile(), CONTROLLER).unwrap();
        let mut sink = Collect::default();

        bridge.route(&PinReport::new(ReportKind::Encoder, 16, 3, ms(10)), &mut sink);
        bridge.route(&PinReport::new(ReportKind::Encoder, 16, 4, ms(20)), &mut sink);
        bridge.publish_encoder_speeds(ms(100), &mut sink);

        assert_eq!(sink.readings.last().map(|r| r.2), Some(Reading::EncoderSpeed(7)));
    }

    #[test]
    fn test_actuator_dispatch() {
        let board = MockBoard::new();
        let pins = PinValueService::new(RawPins, profile());
        let mut bridge = Bridge::new(&board, &pins, &config(), &profile(), CONTROLLER).unwrap();

        block_on(async {
            bridge.set_motor_speed("left", 40).await.unwrap();
            bridge.set_servo_angle("arm", 45).await.unwrap();
            bridge.set_led_value("status", 100).await.unwrap();
            assert_eq!(
                bridge.set_motor_speed("right", 40).await,
                Err(BridgeError::UnknownDevice)
            );
        });

        let ops = board.ops();
        assert!(ops.contains(&Op::Pwm(20, 102)));
        assert!(ops.contains(&Op::Servo(12, 45)));
        assert!(ops.contains(&Op::Pwm(25, 255)));
    }

    #[test]
    fn test_display_failure_is_reported() {
        let board = MockBoard::new();
        let pins = PinValueService::new(RawPins, profile());
        let mut bridge = Bridge::new(&board, &pins, &config(), &profile(), CONTROLLER).unwrap();

        block_on(async {
            bridge.display("screen", DisplayContent::Text("hello")).await.unwrap();
            board.reject_i2c_from(board.i2c_writes());
            assert_eq!(
                bridge.display("screen", DisplayContent::Text("again")).await,
                Err(BridgeError::Display(DisplayError::BusFailure))
            );
            assert_eq!(
                bridge.display("screen", DisplayContent::Text("again")).await,
                Err(BridgeError::Display(DisplayError::Failed))
            );
        });
    }

    #[test]
    fn test_scan_interval() {
        assert_eq!(scan_interval_ms(MaxFrequency::Hz(30)), 33);
        assert_eq!(scan_interval_ms(MaxFrequency::Hz(2000)), 1);
        assert_eq!(scan_interval_ms(MaxFrequency::Hz(2)), 250);
        assert_eq!(scan_interval_ms(MaxFrequency::Hz(1)), 1);
        assert_eq!(scan_interval_ms(MaxFrequency::Unthrottled), 1);
    }

    #[test]
    fn test_dual_intensity_monitors_fit() {
        let board = MockBoard::new();
        let pins = PinValueService::new(RawPins, profile());
        let mut config = BridgeConfig::default();
        for pin in 0..MAX_INTENSITY_SENSORS as u8 {
            config
                .intensity
                .push(IntensityConfig {
                    name: label("line"),
                    controller: label(CONTROLLER),
                    analog: Some(30 + pin),
                    digital: Some(pin),
                    differential: 0,
                })
                .unwrap();
        }
        // Two monitors each still fit
        assert!(Bridge::new(&board, &pins, &config, &profile(), CONTROLLER).is_ok());
    }
}
