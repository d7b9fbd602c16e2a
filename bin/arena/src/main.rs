//! Buzzer Arena
//!
//! Runs one coordinator and several handsets over an in-memory radio.
//!
//! Stdin is the operator console plus a few simulator controls:
//! - `{"enable":[-1]}`, `{"disable":[0,2]}`: console commands
//! - `press N`: tap handset N's button
//! - `enable all` / `disable all`: tap the coordinator's panel buttons
//!
//! Stdin reaching EOF leaves the game running, so `arena < script.txt`
//! replays a script and keeps playing. Ctrl-C stops it after cleanup.
//!
//! Stdout carries only the `{"buzzer":n}` lines; logs go to stderr and `logs/`.
use bzr_coordinator::*;
use bzr_core::*;
use bzr_feedback::Strip;
use bzr_handset::*;
use bzr_radio::Ether;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc::UnboundedSender;

const NAMES: [&str; 4] = ["Red", "Green", "Blue", "Yellow"];

#[derive(Parser, Debug)]
#[command(about = "Simulated buzzer game")]
struct Args {
    /// Number of handsets
    #[arg(long, default_value_t = 4)]
    players: usize,
    /// Probability that any single radio frame is lost
    #[arg(long, default_value_t = 0.0)]
    loss: f64,
}

/// Simulator inputs reachable from stdin.
struct Controls {
    commands: UnboundedSender<String>,
    buttons: Vec<Pin>,
    enable_all: Pin,
    disable_all: Pin,
}

impl Controls {
    fn handle(&self, line: &str) {
        let line = line.trim();
        match line.split_whitespace().collect::<Vec<_>>().as_slice() {
            [] => {}
            _ if line.starts_with('{') => {
                if self.commands.send(line.to_string()).is_err() {
                    log::warn!("[arena] coordinator console is gone");
                }
            }
            ["press", n] => match n.parse::<usize>().ok().and_then(|n| self.buttons.get(n)) {
                Some(button) => tap(button.clone(), Duration::from_millis(30)),
                None => log::warn!("[arena] no handset {}", n),
            },
            ["enable", "all"] => tap(self.enable_all.clone(), Duration::from_millis(150)),
            ["disable", "all"] => tap(self.disable_all.clone(), Duration::from_millis(150)),
            _ => log::warn!("[arena] unrecognized input {:?}", line),
        }
    }
}

fn tap(button: Pin, hold: Duration) {
    button.press();
    tokio::spawn(async move {
        tokio::time::sleep(hold).await;
        button.release();
    });
}

fn handset(ether: &Ether, name: &str) -> Pin {
    let button = Pin::pulled_up();
    let handset = Handset::new(
        Arc::new(ether.join(Address::random())),
        Arc::new(button.clone()),
        Arc::new(Pin::dark()),
        Strip::new(1).shared(),
        HandsetConfig::named(name),
    );
    log::info!("[arena] handset {} at {}", name, handset.address());
    tokio::spawn(async move {
        let error = handset.run().await;
        log::error!("[arena] handset stopped: {:#}", error);
    });
    button
}

/// Feeds input lines to the controls. The console stays open after EOF.
async fn operator<R>(input: R, controls: Controls) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        controls.handle(&line);
    }
    log::info!("[arena] stdin closed, game keeps running");
    std::future::pending::<()>().await;
    drop(controls);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    bzr_core::log()?;
    let args = Args::parse();
    let ether = Ether::lossy(args.loss);
    let enable_all = Pin::pulled_up();
    let disable_all = Pin::pulled_up();
    let (coordinator, console) = Coordinator::new(
        Arc::new(ether.join(Address::random())),
        Strip::new(BAR_LENGTH).shared(),
        CoordinatorConfig::default(),
    );
    let coordinator = coordinator.with_panel(Panel::new(
        Arc::new(enable_all.clone()),
        Arc::new(disable_all.clone()),
    ));
    let buttons = (0..args.players)
        .map(|i| match NAMES.get(i) {
            Some(name) => handset(&ether, name),
            None => handset(&ether, &format!("Player{}", i)),
        })
        .collect::<Vec<_>>();
    let Console {
        commands,
        mut buzzes,
    } = console;
    tokio::spawn(async move {
        while let Some(line) = buzzes.recv().await {
            println!("{}", line);
        }
    });
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let controls = Controls {
            commands,
            buttons,
            enable_all,
            disable_all,
        };
        if let Err(e) = operator(stdin, controls).await
        {
            log::error!("[arena] stdin failed: {}", e);
        }
    });
    Err(coordinator.with_loop("signal", interrupted()).run().await)
}
