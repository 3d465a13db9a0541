//! The controller wired to the embedded-hal adapters, with mock PWM channels
//! and input pins standing in for the board.

use std::cell::Cell;
use std::convert::Infallible;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use embedded_hal::digital::{self, InputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use otomo_hardware::{HBridge, MotorEffort, OpenLoopDrive, PinPulseInput};
use otomo_motion::time::instant_from_millis;
use otomo_motion::{MotionConfig, MotionController};

const MAX_DUTY: u16 = 1000;

#[derive(Clone, Default)]
struct Channel(Rc<Cell<u16>>);

impl pwm::ErrorType for Channel {
    type Error = Infallible;
}

impl SetDutyCycle for Channel {
    fn max_duty_cycle(&self) -> u16 {
        MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.0.set(duty);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Pin(Rc<Cell<bool>>);

impl digital::ErrorType for Pin {
    type Error = Infallible;
}

impl InputPin for Pin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }
}

struct Board {
    left_fwd: Channel,
    left_rev: Channel,
    right_fwd: Channel,
    right_rev: Channel,
    left_pin: Pin,
}

type Bridge = HBridge<Channel, Channel>;
type Controller = MotionController<Bridge, Bridge, PinPulseInput<Pin>, PinPulseInput<Pin>>;

fn setup() -> (Board, Controller) {
    let board = Board {
        left_fwd: Channel::default(),
        left_rev: Channel::default(),
        right_fwd: Channel::default(),
        right_rev: Channel::default(),
        left_pin: Pin::default(),
    };
    let ctrl = MotionController::new(
        MotionConfig::default(),
        HBridge::new(board.left_fwd.clone(), board.left_rev.clone()),
        HBridge::new(board.right_fwd.clone(), board.right_rev.clone()),
        PinPulseInput::new(board.left_pin.clone()),
        PinPulseInput::new(Pin::default()),
    )
    .unwrap();
    (board, ctrl)
}

#[test]
fn idle_controller_leaves_bridges_released() {
    let (board, ctrl) = setup();
    assert_eq!(board.left_fwd.0.get(), 0);
    assert_eq!(board.left_rev.0.get(), 0);
    let (left, right) = ctrl.motors();
    assert_eq!(left.current_effort(), MotorEffort::Release);
    assert_eq!(right.current_effort(), MotorEffort::Release);
}

#[test]
fn move_command_sets_duty_cycles() {
    let (board, mut ctrl) = setup();
    ctrl.set_heading(FRAC_PI_2).unwrap();
    ctrl.drive(0.0, 1.0, instant_from_millis(0)).unwrap();

    // Turning in place: left wheel backwards, right wheel forwards.
    assert_eq!(board.left_fwd.0.get(), 0);
    assert_eq!(board.left_rev.0.get(), MAX_DUTY);
    assert_eq!(board.right_fwd.0.get(), MAX_DUTY);
    assert_eq!(board.right_rev.0.get(), 0);

    ctrl.halt();
    assert_eq!(board.left_rev.0.get(), 0);
    assert_eq!(board.right_fwd.0.get(), 0);
}

#[test]
fn pin_edges_feed_odometry() {
    let (board, mut ctrl) = setup();
    ctrl.drive(0.0, 0.5, instant_from_millis(0)).unwrap();

    let mut level = false;
    for t in 1..=4 {
        level = !level;
        board.left_pin.0.set(level);
        assert!(ctrl.poll(instant_from_millis(t * 20)).is_some());
        assert!(ctrl.poll(instant_from_millis(t * 20 + 1)).is_none());
    }
    assert_eq!(ctrl.pose().at, instant_from_millis(80));
    assert!(ctrl.heading() > 0.0);
    assert!(ctrl.x() > 0.0);
}
