// Keychord CLI
// Replays an input trace and prints every event name it triggers

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context as _, Result};
use clap::Parser;

use keychord_core::input::raw::{ClickKind, ClipboardAction, Transition};
use keychord_core::{
    GamepadButton, GamepadSnapshot, HumanInput, KeyInput, ManualClock, PointerButton,
    PointerInput, RawEvent, RawEventKind, Settings,
};

/// Replay a keyboard/pointer trace through the combo engine
#[derive(Parser, Debug)]
#[command(name = "keychord")]
#[command(version)]
#[command(about = "Show the combo and sequence events an input trace produces", long_about = None)]
struct Args {
    /// Trace file (reads stdin when omitted)
    #[arg(value_name = "TRACE")]
    trace: Option<PathBuf>,

    /// TOML settings file
    #[arg(short, long, value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// Only print event names matching this regex
    #[arg(short, long, value_name = "REGEX")]
    filter: Option<String>,

    /// Print the default settings file and exit
    #[arg(long)]
    print_default_settings: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// One trace instruction
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Event(RawEvent),
    /// New state for one gamepad; every plugged-in pad is polled
    Gamepad(GamepadSnapshot),
    Unplug(u32),
    Press(String),
    Release(String),
    Tap(String),
    Wait(u64),
    Pause,
    Resume,
    Reset,
    Init,
}

fn number<T: FromStr>(field: Option<&str>, what: &str) -> Result<T> {
    let field = field.ok_or_else(|| anyhow!("missing {}", what))?;
    field
        .parse()
        .map_err(|_| anyhow!("invalid {}: {:?}", what, field))
}

fn word<'a>(field: Option<&'a str>, what: &str) -> Result<&'a str> {
    field.ok_or_else(|| anyhow!("missing {}", what))
}

/// Key names are written as-is except `Space`, which stands for " "
fn key_name(raw: &str) -> String {
    if raw.eq_ignore_ascii_case("space") {
        " ".to_string()
    } else {
        raw.to_string()
    }
}

fn parse_key(transition: Transition, fields: &mut std::str::SplitWhitespace) -> Result<KeyInput> {
    let raw = word(fields.next(), "key")?;
    let key = key_name(raw);
    let code = fields.next().unwrap_or(raw).to_string();
    let mut input = match transition {
        Transition::Down => KeyInput::down(key, code),
        Transition::Up => KeyInput::up(key, code),
    };
    if fields.next() == Some("repeat") {
        input = input.repeated();
    }
    Ok(input)
}

fn parse_pointer(transition: Transition, fields: &mut std::str::SplitWhitespace) -> Result<PointerInput> {
    let button = PointerButton::from_index(number(fields.next(), "button")?);
    let x = number(fields.next(), "x")?;
    let y = number(fields.next(), "y")?;
    Ok(PointerInput::mouse(transition, button, x, y))
}

/// `gamepad <index> <timestamp> <buttons> [axes...]` where `buttons` is a
/// string of `0`/`1` per button
fn parse_gamepad(fields: &mut std::str::SplitWhitespace) -> Result<GamepadSnapshot> {
    let index = number(fields.next(), "gamepad index")?;
    let timestamp = number(fields.next(), "timestamp")?;
    let buttons = word(fields.next(), "buttons")?;
    let axes = fields
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()
        .context("invalid axis value")?;
    let mut pad = GamepadSnapshot::new(index, buttons.len(), axes.len()).at(timestamp);
    for (button, state) in buttons.chars().enumerate() {
        match state {
            '1' => pad = pad.with_button(button, GamepadButton::pressed(1.0)),
            '0' => {}
            other => bail!("invalid button state {:?}", other),
        }
    }
    for (axis, value) in axes.into_iter().enumerate() {
        pad = pad.with_axis(axis, value);
    }
    Ok(pad)
}

/// Parse one trace line; blank lines and `#` comments yield `None`
fn parse_line(line: &str) -> Result<Option<Step>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut fields = line.split_whitespace();
    let Some(command) = fields.next() else {
        return Ok(None);
    };
    let step = match command {
        "keydown" => Step::Event(RawEvent::key(parse_key(Transition::Down, &mut fields)?)),
        "keyup" => Step::Event(RawEvent::key(parse_key(Transition::Up, &mut fields)?)),
        "pointerdown" => Step::Event(RawEvent::pointer(parse_pointer(Transition::Down, &mut fields)?)),
        "pointerup" => Step::Event(RawEvent::pointer(parse_pointer(Transition::Up, &mut fields)?)),
        "click" | "dblclick" | "contextmenu" => {
            let kind = ClickKind::from_str(command)?;
            let button = PointerButton::from_index(fields.next().map(str::parse::<u16>).transpose()?.unwrap_or(0));
            Step::Event(RawEvent::new(RawEventKind::Click { kind, button }))
        }
        "wheel" => {
            let dx = number(fields.next(), "delta x")?;
            let dy = number(fields.next(), "delta y")?;
            let dz = fields.next().map(str::parse::<f64>).transpose()?.unwrap_or(0.0);
            Step::Event(RawEvent::wheel(dx, dy, dz))
        }
        "copy" | "cut" | "paste" => {
            let action = ClipboardAction::from_str(command)?;
            let data: Vec<&str> = fields.by_ref().collect();
            Step::Event(RawEvent::new(RawEventKind::Clipboard {
                action,
                data: Some(data.join(" ")),
            }))
        }
        "resize" => Step::Event(RawEvent::new(RawEventKind::Resize {
            width: number(fields.next(), "width")?,
            height: number(fields.next(), "height")?,
        })),
        "rotate" => Step::Event(RawEvent::new(RawEventKind::OrientationChange {
            angle: number(fields.next(), "angle")?,
        })),
        "gamepad" => Step::Gamepad(parse_gamepad(&mut fields)?),
        "unplug" => Step::Unplug(number(fields.next(), "gamepad index")?),
        "press" => Step::Press(word(fields.next(), "token")?.to_string()),
        "release" => Step::Release(word(fields.next(), "token")?.to_string()),
        "tap" => Step::Tap(word(fields.next(), "token")?.to_string()),
        "wait" => Step::Wait(number(fields.next(), "milliseconds")?),
        "pause" => Step::Pause,
        "resume" => Step::Resume,
        "reset" => Step::Reset,
        "init" => Step::Init,
        other => bail!("unknown command {:?}", other),
    };
    Ok(Some(step))
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::load_default().context("Failed to load default settings")?,
    };
    log::debug!("Using settings: {:?}", settings);
    Ok(settings)
}

fn run(args: &Args) -> Result<()> {
    let settings = load_settings(args.settings.as_ref())?;
    let clock = ManualClock::shared();
    let mut input = HumanInput::with_clock("trace", settings, clock.clone());
    input.init();
    let mut pads: BTreeMap<u32, GamepadSnapshot> = BTreeMap::new();

    let reader: Box<dyn BufRead> = match &args.trace {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(step) = parse_line(&line).with_context(|| format!("line {}", index + 1))? else {
            continue;
        };

        input.start_recording();
        let mut prevented = false;
        match step {
            Step::Event(event) => prevented = input.dispatch(&event).prevent_default,
            Step::Gamepad(pad) => {
                pads.insert(pad.index, pad);
                input.dispatch(&RawEvent::new(RawEventKind::Gamepads(pads.values().cloned().collect())));
            }
            Step::Unplug(index) => {
                pads.remove(&index);
                input.dispatch(&RawEvent::new(RawEventKind::Gamepads(pads.values().cloned().collect())));
            }
            Step::Press(token) => {
                input.press(&token);
            }
            Step::Release(token) => input.release(&token),
            Step::Tap(token) => {
                input.do_down_event(&token);
            }
            Step::Wait(ms) => {
                clock.advance_ms(ms);
                input.poll();
            }
            Step::Pause => input.pause(),
            Step::Resume => input.resume(),
            Step::Reset => input.reset(),
            Step::Init => input.init(),
        }
        let names = input.stop_recording(args.filter.as_deref())?;

        println!("{}", line.trim());
        for name in names {
            println!("  {}", name);
        }
        if prevented {
            println!("  (default prevented)");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if args.print_default_settings {
        print!("{}", keychord_core::settings::default_settings_content());
        return Ok(());
    }

    run(&args)
}
