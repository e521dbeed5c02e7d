//! Operator control plane.
//!
//! The simulation is owned by the tick loop. Other threads talk to it through a
//! `CommandClient`, which sends `Request`s over a channel and blocks for the reply. The
//! tick loop drains the matching `CommandServer` between ticks, so every command sees
//! and changes state at a tick boundary and no lock is held across the physics phases.
//!
//! `CommandInterface` speaks the line protocol on top of a client:
//!
//! ```text
//! get_energy              total kinetic energy
//! set_pistol_pos <x>      move the piston, reset pressure averaging
//! get_pressure            left wall, upper wall and piston pressures
//! get_collisions          collision counter
//! get_piston              piston position and velocity
//! help                    list commands
//! quit                    stop reading commands
//! ```

use crate::core::{PressureReading, Simulation};
use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// What a client wants done.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Energy,
    Pressure,
    SetPistonPosition(f64),
    Collisions,
    Piston,
}

/// The simulation's answer to an `Intent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Energy(f64),
    Pressure(PressureReading),
    PistonMoved,
    Collisions(u64),
    Piston { position: f64, velocity: f64 },
    Rejected(String),
}

/// An intent plus the channel its reply goes back on.
#[derive(Debug)]
pub struct Request {
    pub intent: Intent,
    reply: Sender<Reply>,
}

/// Create a connected client/server pair.
pub fn channel() -> (CommandClient, CommandServer) {
    let (tx, rx) = mpsc::channel();
    (CommandClient { tx }, CommandServer { rx })
}

/// Apply `intent` to `sim`. Must only be called between ticks.
pub fn execute(sim: &mut Simulation, intent: Intent) -> Reply {
    match intent {
        Intent::Energy => Reply::Energy(sim.kinetic_energy()),
        Intent::Pressure => Reply::Pressure(sim.pressure()),
        Intent::SetPistonPosition(x) => match sim.set_piston_position(x) {
            Ok(()) => Reply::PistonMoved,
            Err(e) => Reply::Rejected(e.to_string()),
        },
        Intent::Collisions => Reply::Collisions(sim.collisions()),
        Intent::Piston => Reply::Piston {
            position: sim.piston.position,
            velocity: sim.piston.velocity,
        },
    }
}

/// Sending half; cheap to clone and safe to move to another thread.
#[derive(Debug, Clone)]
pub struct CommandClient {
    tx: Sender<Request>,
}

impl CommandClient {
    /// Send `intent` and wait for the next tick boundary to answer it.
    ///
    /// Errors: `Error::Disconnected` once the server has been dropped.
    pub fn request(&self, intent: Intent) -> Result<Reply> {
        let (reply, rx) = mpsc::channel();
        self.tx
            .send(Request { intent, reply })
            .map_err(|_| Error::Disconnected)?;
        rx.recv().map_err(|_| Error::Disconnected)
    }

    pub fn energy(&self) -> Result<f64> {
        match self.request(Intent::Energy)? {
            Reply::Energy(e) => Ok(e),
            other => Err(unexpected(other)),
        }
    }

    pub fn pressure(&self) -> Result<PressureReading> {
        match self.request(Intent::Pressure)? {
            Reply::Pressure(p) => Ok(p),
            other => Err(unexpected(other)),
        }
    }

    pub fn set_piston_position(&self, position: f64) -> Result<()> {
        match self.request(Intent::SetPistonPosition(position))? {
            Reply::PistonMoved => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub fn collisions(&self) -> Result<u64> {
        match self.request(Intent::Collisions)? {
            Reply::Collisions(n) => Ok(n),
            other => Err(unexpected(other)),
        }
    }

    /// Piston `(position, velocity)`.
    pub fn piston(&self) -> Result<(f64, f64)> {
        match self.request(Intent::Piston)? {
            Reply::Piston { position, velocity } => Ok((position, velocity)),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(reply: Reply) -> Error {
    match reply {
        Reply::Rejected(msg) => Error::InvalidParam(msg),
        other => Error::Command(format!("unexpected reply {other:?}")),
    }
}

/// Receiving half, owned by whoever owns the `Simulation`.
#[derive(Debug)]
pub struct CommandServer {
    rx: Receiver<Request>,
}

impl CommandServer {
    /// Answer every request already queued, without blocking. Returns how many were served.
    pub fn serve_pending(&self, sim: &mut Simulation) -> usize {
        let mut served = 0;
        loop {
            match self.rx.try_recv() {
                Ok(req) => {
                    answer(sim, req);
                    served += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        served
    }

    /// Answer requests until every client has been dropped, with the simulation paused.
    pub fn serve_until_disconnected(&self, sim: &mut Simulation) -> usize {
        let mut served = 0;
        while let Ok(req) = self.rx.recv() {
            answer(sim, req);
            served += 1;
        }
        served
    }
}

fn answer(sim: &mut Simulation, req: Request) {
    let reply = execute(sim, req.intent);
    if req.reply.send(reply).is_err() {
        debug!("client went away before its {:?} reply", req.intent);
    }
}

/// One parsed protocol line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetEnergy,
    /// The position, if it was given on the same line.
    SetPistonPosition(Option<f64>),
    GetPressure,
    GetCollisions,
    GetPiston,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    ///
    /// Errors: `Error::Command` if `set_pistol_pos` carries a malformed number.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };
        let cmd = match word {
            "get_energy" => Command::GetEnergy,
            "set_pistol_pos" | "set_piston_pos" => {
                Command::SetPistonPosition(words.next().map(parse_position).transpose()?)
            }
            "get_pressure" => Command::GetPressure,
            "get_collisions" => Command::GetCollisions,
            "get_piston" => Command::GetPiston,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        };
        Ok(Some(cmd))
    }
}

/// Parse a piston position: a finite number greater than zero.
pub fn parse_position(text: &str) -> Result<f64> {
    let text = text.trim();
    let x: f64 = text
        .parse()
        .map_err(|_| Error::Command(format!("expected a number, got `{text}`")))?;
    if !x.is_finite() || x <= 0.0 {
        return Err(Error::Command(format!(
            "piston position must be finite and > 0, got {x}"
        )));
    }
    Ok(x)
}

enum Flow {
    Continue,
    Stop,
}

/// Reads protocol lines from `input`, answers on `output`.
///
/// Malformed input is answered with an `error:` line and otherwise ignored; unknown
/// commands get a notice. The loop ends at end of input, on `quit`, or when the
/// simulation stops.
pub struct CommandInterface<R, W> {
    input: R,
    output: W,
    client: CommandClient,
}

impl<R: BufRead, W: Write> CommandInterface<R, W> {
    pub fn new(input: R, output: W, client: CommandClient) -> Self {
        Self {
            input,
            output,
            client,
        }
    }

    /// Process commands until the input ends or the simulation goes away.
    ///
    /// Errors: only I/O failures on `input`/`output`.
    pub fn run(mut self) -> Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                debug!("command input closed");
                break;
            }
            let cmd = match Command::parse(&line) {
                Ok(Some(cmd)) => cmd,
                Ok(None) => continue,
                Err(e) => {
                    self.reject(&e)?;
                    continue;
                }
            };
            match self.handle(cmd) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break,
                Err(Error::Disconnected) => {
                    info!("simulation stopped; command reader exiting");
                    break;
                }
                Err(e @ (Error::Command(_) | Error::InvalidParam(_))) => self.reject(&e)?,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn handle(&mut self, cmd: Command) -> Result<Flow> {
        match cmd {
            Command::GetEnergy => {
                let e = self.client.energy()?;
                writeln!(self.output, "E: {e}")?;
            }
            Command::SetPistonPosition(value) => {
                let x = match value {
                    Some(x) => x,
                    None => self.prompt_position()?,
                };
                self.client.set_piston_position(x)?;
                writeln!(self.output, "piston position set to {x}")?;
            }
            Command::GetPressure => {
                let p = self.client.pressure()?;
                writeln!(
                    self.output,
                    "left wall: {}  upper wall: {}  piston: {}",
                    p.left, p.top, p.piston
                )?;
            }
            Command::GetCollisions => {
                let n = self.client.collisions()?;
                writeln!(self.output, "collisions: {n}")?;
            }
            Command::GetPiston => {
                let (x, v) = self.client.piston()?;
                writeln!(self.output, "piston position: {x}  velocity: {v}")?;
            }
            Command::Help => {
                writeln!(
                    self.output,
                    "commands: get_energy, set_pistol_pos <x>, get_pressure, \
                     get_collisions, get_piston, help, quit"
                )?;
            }
            Command::Quit => return Ok(Flow::Stop),
            Command::Unknown(word) => {
                writeln!(self.output, "unknown command `{word}` (try `help`)")?;
            }
        }
        self.output.flush()?;
        Ok(Flow::Continue)
    }

    fn prompt_position(&mut self) -> Result<f64> {
        write!(self.output, "piston position: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::Command(
                "expected a piston position, got end of input".into(),
            ));
        }
        parse_position(&line)
    }

    fn reject(&mut self, e: &Error) -> Result<()> {
        warn!("rejected command: {e}");
        writeln!(self.output, "error: {e}")?;
        self.output.flush()?;
        Ok(())
    }
}
