//! The `run` command: replay a sequence and print the queue as it evolves

use super::{load_config, RunArgs};
use anyhow::{Context, Result};
use qsim_components::{Generator, Server};
use qsim_core::RequestRecord;
use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

pub fn execute(args: RunArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let capacity = config.queue_capacity;

    let server = Arc::new(
        Server::builder(config)
            .name(args.name.as_str())
            .poll_interval(Duration::from_millis(args.poll_ms))
            .build()
            .context("Failed to start server")?,
    );
    let generator = Arc::new(Generator::new(Arc::clone(&server)));

    if args.interactive {
        spawn_controls(Arc::clone(&generator))?;
        println!("Controls: pause, resume, p (toggle), stop");
    }
    generator.start().context("Failed to start generator")?;

    let refresh = Duration::from_millis(args.refresh_ms.max(1));
    let mut printed = 0;
    let mut last_view = String::new();
    loop {
        let view = render_queue(&server.snapshot(), capacity, server.in_service().as_ref());
        if view != last_view {
            println!("{view}");
            last_view = view;
        }
        for entry in server.log().since(printed) {
            println!("{entry}");
            printed += 1;
        }

        if generator.is_finished() && server.is_idle() {
            break;
        }
        thread::sleep(refresh);
    }

    generator.join();
    server.stop();
    for entry in server.log().since(printed) {
        println!("{entry}");
    }

    println!();
    println!("Last {} events:", args.tail);
    for entry in server.log().tail(args.tail) {
        println!("  {entry}");
    }
    println!();
    println!("{}", server.metrics());
    Ok(())
}

/// One-line picture of the queue, oldest request first
fn render_queue(
    queued: &[RequestRecord],
    capacity: usize,
    in_service: Option<&RequestRecord>,
) -> String {
    let slots: Vec<String> = (0..capacity)
        .map(|slot| match queued.get(slot) {
            Some(record) => record.name().to_string(),
            None => "-".to_string(),
        })
        .collect();
    let serving = in_service.map_or("idle", RequestRecord::name);
    format!("queue [{}] -> server ({serving})", slots.join(" | "))
}

/// Forward stdin commands to the generator
fn spawn_controls(generator: Arc<Generator>) -> Result<()> {
    thread::Builder::new()
        .name("qsim-controls".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let outcome = match line.trim() {
                    "pause" => generator.pause().map(|_| "paused"),
                    "resume" => generator.resume().map(|_| "resumed"),
                    "p" => generator.toggle_pause().map(|state| state.as_str()),
                    "stop" => generator.stop().map(|_| "stopped"),
                    "" => continue,
                    other => {
                        warn!(command = other, "Unknown command");
                        continue;
                    }
                };
                match outcome {
                    Ok(done) => info!(state = done, "Playback control applied"),
                    Err(err) => eprintln!("{err}"),
                }
                if generator.is_finished() {
                    break;
                }
            }
        })
        .context("Failed to spawn control thread")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsim_core::RequestType;

    #[test]
    fn test_render_queue() {
        let queued = vec![
            RequestRecord::new("Read1", RequestType::Read),
            RequestRecord::new("Write1", RequestType::Write),
        ];
        let serving = RequestRecord::new("Forward1", RequestType::Forward);
        assert_eq!(
            render_queue(&queued, 3, Some(&serving)),
            "queue [Read1 | Write1 | -] -> server (Forward1)"
        );
        assert_eq!(render_queue(&[], 2, None), "queue [- | -] -> server (idle)");
    }
}
