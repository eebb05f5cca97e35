//! Interactive command-line driver for the engine.
//!
//! This is view glue: it maps typed commands and note names onto the
//! engine's public operations and prints the observable state back. All
//! temporal logic lives in the engine.

use crate::engine::{Engine, EngineStatus};
use crate::types::{note_frequency, NoteId, Waveform};
use anyhow::Result;
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Interactive REPL driving a live engine
pub struct Repl {
    editor: DefaultEditor,
    engine: Engine,
}

impl Repl {
    pub fn new() -> Result<Self> {
        Ok(Repl {
            editor: DefaultEditor::new()?,
            engine: Engine::new(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", "clavier - type 'help' for commands".bold());
        loop {
            match self.editor.readline("clavier> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line);
                    if !self.handle_line(line) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("{}: {}", "readline error".red(), e);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Handle one input line, returns false on quit
    fn handle_line(&mut self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let arg = parts.next();

        let result = match (command, arg) {
            ("on", Some(name)) => self.with_note(name, |engine, note, freq| {
                engine.note_on(note, freq)
            }),
            ("off", Some(name)) => {
                self.engine.note_off(NoteId::from(name));
                Ok(())
            }
            ("drone", Some(name)) => self.with_note(name, |engine, note, freq| {
                engine.toggle_drone(note, freq)
            }),
            ("record", _) => self.engine.start_recording(),
            ("stop", _) => {
                self.engine.stop_recording();
                Ok(())
            }
            ("play", _) => self.engine.play(),
            ("clear", _) => {
                self.engine.clear_recording();
                Ok(())
            }
            ("vol", Some(value)) => match value.parse::<f32>() {
                Ok(v) => {
                    self.engine.set_volume(v);
                    Ok(())
                }
                Err(_) => {
                    println!("{}", "usage: vol <0.0-1.0>".yellow());
                    Ok(())
                }
            },
            ("wave", Some(name)) => match Waveform::from_str(name) {
                Some(w) => {
                    self.engine.set_waveform(w);
                    Ok(())
                }
                None => {
                    println!("{}", "waveforms: sine, saw, square, triangle".yellow());
                    Ok(())
                }
            },
            ("status", _) => {
                self.print_status();
                Ok(())
            }
            ("help", _) => {
                self.print_help();
                Ok(())
            }
            ("quit", _) | ("exit", _) => return false,
            _ => {
                println!("{}", "unknown command - type 'help'".yellow());
                Ok(())
            }
        };

        if let Err(e) = result {
            eprintln!("{}: {}", "error".red(), e);
        }
        true
    }

    /// Parse a note name and hand the id + frequency to an engine call
    fn with_note(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Engine, NoteId, f32) -> Result<()>,
    ) -> Result<()> {
        match note_frequency(name) {
            Ok(freq) => f(&mut self.engine, NoteId::from(name), freq),
            Err(e) => {
                println!("{}", format!("{}", e).yellow());
                Ok(())
            }
        }
    }

    fn print_status(&mut self) {
        let status = self.engine.status();
        let status_str = match status {
            EngineStatus::Idle => status.name().normal(),
            EngineStatus::Recording => status.name().red(),
            EngineStatus::Playing => status.name().green(),
        };
        println!("status:    {}", status_str);
        println!(
            "sounding:  {}",
            join_notes(&self.engine.sounding_notes()).cyan()
        );
        println!(
            "drones:    {}",
            join_notes(&self.engine.active_drones()).cyan()
        );
        println!("waveform:  {}", self.engine.waveform().name());
        println!("volume:    {:.2}", self.engine.volume());
        println!(
            "recording: {}",
            if self.engine.has_recording() {
                format!("{} events", self.engine.recording().len())
            } else {
                "empty".to_string()
            }
        );
    }

    fn print_help(&self) {
        println!("{}", "commands:".bold());
        println!("  on <note>      start a note        (e.g. on C4)");
        println!("  off <note>     release a note");
        println!("  drone <note>   toggle a sine drone");
        println!("  record         start recording");
        println!("  stop           stop recording");
        println!("  play           replay the recording");
        println!("  clear          discard the recording");
        println!("  vol <0..1>     set master volume");
        println!("  wave <shape>   sine | saw | square | triangle");
        println!("  status         show engine state");
        println!("  quit           exit");
    }
}

fn join_notes(notes: &[NoteId]) -> String {
    if notes.is_empty() {
        return "-".to_string();
    }
    notes
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
