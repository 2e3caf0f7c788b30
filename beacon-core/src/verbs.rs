//! Verb handlers and the capability-driven verb table
//!
//! Every board gets the same base vocabulary. Clock, channel, audio and
//! ring verbs are registered only when the board has that collaborator.

use core::fmt::Write;

use beacon_hal::{AudioPlayer, DistanceSensor, RealTimeClock, Rgb};
use beacon_protocol::{Command, Response};
use heapless::String;

use crate::board::Board;
use crate::color;
use crate::config::{Capabilities, MAX_CHANNELS};
use crate::controller::Controller;
use crate::dispatch::{Dispatcher, Reply, Verb, VerbError};
use crate::output::{Direction, Feedback, FeedbackClass, RingDriver, RingError};
use crate::palette::Palette;
use crate::time::{format_iso, parse_timestamp};

/// Payload returned by `data` on boards without a sensor
pub const SAMPLE_DATA: &str = "0000 1111 2222 3333 4444 5555 6666 7777";

const CHANNEL_VERBS: [&str; MAX_CHANNELS] = ["ch1", "ch2", "ch3", "ch4", "ch5", "ch6"];

type VerbResult = Result<Reply, VerbError>;

impl From<RingError> for VerbError {
    fn from(_: RingError) -> Self {
        VerbError::BadArgument
    }
}

/// Build the verb table for a board
pub fn verb_table<B: Board>(caps: &Capabilities) -> Dispatcher<Controller<B>> {
    let mut dispatcher = Dispatcher::new();
    let mut add = |verb: Verb<Controller<B>>| {
        if dispatcher.register(verb).is_err() {
            error!("verb table full");
        }
    };

    add(Verb::deferred("help", help::<B>));
    add(Verb::immediate("ping", ping::<B>));
    add(Verb::immediate("data", data::<B>));
    add(Verb::immediate("reset", reset::<B>));
    add(Verb::immediate("pixel", pixel::<B>));
    add(Verb::immediate("persist", persist::<B>));
    add(Verb::immediate("heartbeat", heartbeat::<B>));
    add(Verb::immediate("rgb", rgb::<B>));
    add(Verb::deferred("colors", colors::<B>));

    if caps.clock {
        add(Verb::immediate("time", time::<B>));
    }
    if caps.has_channels() {
        for &name in CHANNEL_VERBS.iter().take(caps.channel_count) {
            add(Verb::immediate(name, channel::<B>));
        }
        add(Verb::immediate("all", channel::<B>));
    }
    if caps.audio {
        add(Verb::deferred("play", play::<B>));
        add(Verb::deferred("sounds", sounds::<B>));
    }
    if caps.has_ring() {
        add(Verb::immediate("ring", ring::<B>));
        add(Verb::immediate("rotate", rotate::<B>));
        add(Verb::immediate("theme", theme::<B>));
    }
    dispatcher
}

fn on_off(arg: Option<&str>) -> Result<bool, VerbError> {
    match arg {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(VerbError::BadArgument),
    }
}

fn color_arg(cmd: &Command, first: usize) -> Result<Rgb, VerbError> {
    let name = cmd.arg(first).ok_or(VerbError::BadArgument)?;
    color::lookup_tokens(name, cmd.arg(first + 1)).ok_or(VerbError::BadArgument)
}

fn number<T: core::str::FromStr>(cmd: &Command, index: usize) -> Result<T, VerbError> {
    cmd.arg_parsed(index).ok_or(VerbError::BadArgument)
}

fn ring_of<B: Board>(
    ctrl: &mut Controller<B>,
) -> Result<(&mut RingDriver<B>, &mut B::Rng), VerbError> {
    ctrl.output_mut().ring_mut().ok_or(VerbError::Unsupported)
}

const HELP: &[&str] = &[
    "help                                 # this help",
    "ping                                 # returns PING",
    "data                                 # distance or sample data",
    "reset                                # hardware reset",
    "pixel off | clear | <color>          # status pixel",
    "persist on | off                     # keep pixel after feedback",
    "heartbeat on | off                   # heartbeat flash",
    "rgb [<n>] <red> <green> <blue>       # set pixel to RGB",
    "colors                               # list colour names",
];

fn help<B: Board>(ctrl: &mut Controller<B>, _: &Command) -> Result<(), VerbError> {
    let caps = ctrl.capabilities();
    info!("commands:");
    for line in HELP {
        info!("    {}", line);
    }
    if caps.clock {
        info!("    time get | set <YYYYMMDD-HHMMSS>");
    }
    if caps.has_channels() {
        info!("    ch1..ch{} | all on | off", caps.channel_count);
    }
    if caps.audio {
        info!("    play <name> | sounds");
    }
    if caps.has_ring() {
        info!("    ring clear | all (off | <color>) | <n> <color>");
        info!("    rotate on | off | fwd | cw | rev | ccw | hz <n> | <shift>");
        info!("    theme on | off | hz <n> | pixels <n> | <palette> <n> | steps <n>");
    }
    Ok(())
}

fn colors<B: Board>(_: &mut Controller<B>, _: &Command) -> Result<(), VerbError> {
    for named in color::visible() {
        info!(
            "{}: ({}, {}, {})",
            named.name, named.rgb.r, named.rgb.g, named.rgb.b
        );
    }
    Ok(())
}

fn ping<B: Board>(_: &mut Controller<B>, _: &Command) -> VerbResult {
    Ok(Reply::new(
        Response::Pong,
        Feedback::Class(FeedbackClass::Success),
    ))
}

fn data<B: Board>(ctrl: &mut Controller<B>, _: &Command) -> VerbResult {
    let Some(sensor) = ctrl.sensor_mut() else {
        return Ok(Reply::data(SAMPLE_DATA, FeedbackClass::Data));
    };
    let mm = sensor.read_distance().map_err(|_| VerbError::Hardware)?;
    let mut text: String<16> = String::new();
    write!(text, "{} mm", mm).map_err(|_| VerbError::Hardware)?;
    Ok(Reply::data(&text, FeedbackClass::Data))
}

fn reset<B: Board>(ctrl: &mut Controller<B>, _: &Command) -> VerbResult {
    ctrl.request_reset();
    Ok(Reply::ack(FeedbackClass::Success))
}

fn pixel<B: Board>(ctrl: &mut Controller<B>, cmd: &Command) -> VerbResult {
    let color = match cmd.arg(0) {
        Some("off") | Some("clear") => Rgb::BLACK,
        _ => color_arg(cmd, 0)?,
    };
    ctrl.output_mut().set_heartbeat(false);
    Ok(Reply::ack_with(Feedback::Direct(color)))
}

fn persist<B: Board>(ctrl: &mut Controller<B>, cmd: &Command) -> VerbResult {
    let on = on_off(cmd.arg(0))?;
    ctrl.output_mut().set_persist(on);
    // black while persisting, so the feedback itself does not stick
    let class = if on {
        FeedbackClass::Quiet
    } else {
        FeedbackClass::Success
    };
    Ok(Reply::ack(class))
}

fn heartbeat<B: Board>(ctrl: &mut Controller<B>, cmd: &Command) -> VerbResult {
    let on = on_off(cmd.arg(0))?;
    ctrl.output_mut().set_heartbeat(on);
    Ok(Reply::ack(FeedbackClass::Success))
}

fn rgb<B: Board>(ctrl: &mut Controller<B>, cmd: &Command) -> VerbResult {
    let (index, first) = match cmd.token_count() {
        5 => (number::<usize>(cmd, 0)?, 1),
        4 => (1, 0),
        _ => return Err(VerbError::BadArgument),
    };
    let color = Rgb::new(
        number(cmd, first)?,
        number(cmd, first + 1)?,
        number(cmd, first + 2)?,
    );
    ctrl.output_mut().set_heartbeat(false);

    if let Some((ring, _)) = ctrl.output_mut().ring_mut() {
        let physical = index.checked_sub(1).ok_or(VerbError::BadArgument)?;
        ring.set_pixel(physical, color)?;
        return Ok(Reply::ack_with(Feedback::Suppressed));
    }
    Ok(Reply::ack_with(Feedback::Direct(color)))
}

fn time<B: Board>(ctrl: &mut Controller<B>, cmd: &Command) -> VerbResult {
    let clock = ctrl.clock_mut()?;
    match cmd.arg(0) {
        Some("get") => {
            let now = clock.now().map_err(|_| VerbError::Hardware)?;
            Ok(Reply::data(&format_iso(&now), FeedbackClass::Success))
        }
        Some("set") => {
            let stamp = cmd.arg(1).ok_or(VerbError::BadArgument)?;
            let datetime = parse_timestamp(stamp).ok_or(VerbError::BadArgument)?;
            clock.set(datetime).map_err(|_| VerbError::Hardware)?;
            info!("clock set to {}", stamp);
            Ok(Reply::ack(FeedbackClass::Success))
        }
        _ => Err(VerbError::BadArgument),
    }
}

fn channel<B: Board>(ctrl: &mut Controller<B>, cmd: &Command) -> VerbResult {
    if cmd.token_count() != 2 {
        return Err(VerbError::Unrecognized);
    }
    let on = on_off(cmd.arg(0))?;
    let channels = ctrl.channels_mut()?;
    match cmd.verb() {
        "all" => channels.set_all(on),
        verb => {
            let number: usize = verb
                .strip_prefix("ch")
                .and_then(|n| n.parse().ok())
                .ok_or(VerbError::Unrecognized)?;
            let index = number.checked_sub(1).ok_or(VerbError::Unsupported)?;
            if !channels.set(index, on) {
                return Err(VerbError::Unsupported);
            }
        }
    }
    Ok(Reply::ack(FeedbackClass::Success))
}

fn play<B: Board>(ctrl: &mut Controller<B>, cmd: &Command) -> Result<(), VerbError> {
    let name = cmd.arg(0).ok_or(VerbError::BadArgument)?;
    let audio = ctrl.audio_mut()?;
    if !audio.has_sound(name) {
        warn!("no sound named '{}'", name);
        return Err(VerbError::BadArgument);
    }
    info!("playing '{}'", name);
    audio.play(name).map_err(|_| VerbError::Hardware)
}

fn sounds<B: Board>(ctrl: &mut Controller<B>, _: &Command) -> Result<(), VerbError> {
    let audio = ctrl.audio_mut()?;
    info!("sounds:");
    for name in audio.sounds() {
        info!("    {}", name);
    }
    Ok(())
}

fn ring<B: Board>(ctrl: &mut Controller<B>, cmd: &Command) -> VerbResult {
    let (ring, _) = ring_of(ctrl)?;
    match cmd.arg(0) {
        Some("clear") => ring.clear(),
        Some("all") => match cmd.arg(1) {
            Some("off") | Some("clear") => ring.clear(),
            _ => ring.fill(color_arg(cmd, 1)?),
        },
        Some(_) => {
            let number: usize = number(cmd, 0)?;
            let physical = number.checked_sub(1).ok_or(VerbError::BadArgument)?;
            ring.set_pixel(physical, color_arg(cmd, 1)?)?;
        }
        None => return Err(VerbError::BadArgument),
    }
    Ok(Reply::ack_with(Feedback::Suppressed))
}

fn rotate<B: Board>(ctrl: &mut Controller<B>, cmd: &Command) -> VerbResult {
    let (ring, _) = ring_of(ctrl)?;
    match cmd.arg(0) {
        Some("on") => ring.set_rotating(true),
        Some("off") => ring.set_rotating(false),
        Some("fwd") | Some("cw") => ring.set_direction(Direction::Forward),
        Some("rev") | Some("ccw") => ring.set_direction(Direction::Reverse),
        Some("hz") => ring.set_rotate_hz(number(cmd, 1)?)?,
        Some(_) => ring.rotate_by(number(cmd, 0)?)?,
        None => return Err(VerbError::BadArgument),
    }
    Ok(Reply::ack(FeedbackClass::Success))
}

fn theme<B: Board>(ctrl: &mut Controller<B>, cmd: &Command) -> VerbResult {
    let (ring, rng) = ring_of(ctrl)?;
    match cmd.arg(0) {
        Some("on") => ring.set_theming(true, rng),
        Some("off") => ring.set_theming(false, rng),
        Some("hz") => ring.set_theme_hz(number(cmd, 1)?)?,
        Some("steps") => ring.set_pulse_steps(number(cmd, 1)?)?,
        Some("pixels") => ring.set_theme_pixels(number(cmd, 1)?, rng)?,
        Some(name) => {
            let palette = Palette::from_name(name).ok_or(VerbError::BadArgument)?;
            ring.apply_palette(palette, number(cmd, 1)?, rng)?;
        }
        None => return Err(VerbError::BadArgument),
    }
    Ok(Reply::ack(FeedbackClass::Success))
}
