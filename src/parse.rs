//! Parser for whitespace-token program decks.
//!
//! A deck is `total_procs num_nodes quantum`, then for each process a
//! `name size priority node` record followed by its program. Program
//! tokens are `DOOP k`, `BLOCK k`, `SEND addr`, `RECV addr`, `HALT`, and
//! `LOOP n … END`; loops nest and are expanded inline, so the engine only
//! ever sees the five flat instructions.
//!
//! # Recovery rules
//!
//! - An unknown program token is skipped.
//! - A missing or non-numeric argument counts as 0 and the offending
//!   token stays in the stream (it is read again as a program word).
//! - `HALT` ends a program. A program without `HALT` consumes tokens to
//!   end of input, including anything that looks like a later process
//!   record.
//! - `END` outside a loop body is skipped.

use std::fmt;
use std::iter::Peekable;
use std::str::SplitWhitespace;

use tracing::debug;

use crate::process::{Op, ProcDef};
use crate::scenario::Scenario;
use crate::types::{Addr, NodeId, Tick};

/// Errors from parsing a program deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Fewer than three integers at the start of input.
    MalformedHeader,
    /// A quantum of zero would stall the scheduler forever.
    ZeroQuantum,
    /// A process record (0-based index) with fewer than four fields.
    MalformedProcess { index: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedHeader => {
                write!(f, "malformed header: expected `total_procs num_nodes quantum`")
            }
            ParseError::ZeroQuantum => write!(f, "quantum must be at least 1"),
            ParseError::MalformedProcess { index } => {
                write!(
                    f,
                    "malformed process record {}: expected `name size priority node`",
                    index + 1
                )
            }
        }
    }
}

type Tokens<'a> = Peekable<SplitWhitespace<'a>>;

/// Parse a complete deck into a [`Scenario`].
pub fn parse_deck(input: &str) -> Result<Scenario, ParseError> {
    let mut tokens = input.split_whitespace().peekable();

    let total_procs = header_int(&mut tokens)?.max(0) as usize;
    let num_nodes = header_int(&mut tokens)?.clamp(0, u32::MAX as i64) as u32;
    let quantum = header_int(&mut tokens)?;
    if quantum <= 0 {
        return Err(ParseError::ZeroQuantum);
    }

    let mut procs = Vec::with_capacity(total_procs);
    for index in 0..total_procs {
        procs.push(parse_proc(&mut tokens, index)?);
    }

    Ok(Scenario {
        num_nodes,
        quantum: quantum as Tick,
        procs,
    })
}

fn header_int(tokens: &mut Tokens) -> Result<i64, ParseError> {
    tokens
        .next()
        .and_then(|t| t.parse::<i64>().ok())
        .ok_or(ParseError::MalformedHeader)
}

fn parse_proc(tokens: &mut Tokens, index: usize) -> Result<ProcDef, ParseError> {
    let err = ParseError::MalformedProcess { index };
    let name = tokens.next().ok_or(err.clone())?.to_string();
    let size = record_int(tokens).ok_or(err.clone())?;
    let priority = record_int(tokens).ok_or(err.clone())?;
    let node = record_int(tokens).ok_or(err)?;

    let (program, _halted) = parse_block(tokens, false);

    Ok(ProcDef {
        name,
        size: size.max(0) as u32,
        priority: priority.max(0) as u32,
        node: NodeId(node.clamp(0, u32::MAX as i64) as u32),
        program,
    })
}

fn record_int(tokens: &mut Tokens) -> Option<i64> {
    tokens.next().and_then(|t| t.parse::<i64>().ok())
}

/// Read program tokens, expanding loops, until HALT or end of input
/// (or until END when reading a loop body).
///
/// Returns the flat instruction list and whether a HALT ended it. A HALT
/// inside a loop body ends the *body* (and is replicated with it); the
/// outer program continues after the loop.
fn parse_block(tokens: &mut Tokens, stop_on_end: bool) -> (Vec<Op>, bool) {
    let mut out = Vec::new();
    while let Some(token) = tokens.next() {
        match token {
            "END" if stop_on_end => return (out, false),
            "END" => {}
            "LOOP" => {
                let times = take_arg(tokens);
                let (body, _halted) = parse_block(tokens, true);
                for _ in 0..times {
                    out.extend_from_slice(&body);
                }
            }
            "DOOP" => out.push(Op::Doop(take_arg(tokens))),
            "BLOCK" => out.push(Op::Block(take_arg(tokens))),
            "SEND" => out.push(Op::Send(Addr(take_arg(tokens) as u32))),
            "RECV" => out.push(Op::Recv(Addr(take_arg(tokens) as u32))),
            "HALT" => {
                out.push(Op::Halt);
                return (out, true);
            }
            other => {
                debug!(token = other, "skipping unknown program token");
            }
        }
    }
    (out, false)
}

/// The next token as a number if it parses as one; otherwise 0, leaving
/// the token in the stream.
fn take_arg(tokens: &mut Tokens) -> u64 {
    match tokens.peek().and_then(|t| t.parse::<u64>().ok()) {
        Some(value) => {
            tokens.next();
            value
        }
        None => 0,
    }
}
