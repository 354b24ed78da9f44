// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Douglas Crockford's jsmin token stripper
//!
//! Removes comments and insignificant whitespace without parsing. Strings,
//! template literals and regular expression literals are copied verbatim.
//! The output keeps the leading newline the classic implementation emits.

use super::Transform;
use crate::error::{BundleError, Result};

const EOF: i32 = -1;
const BOM_LEAD: i32 = 0xEF;

/// Local jsmin based minifier
#[derive(Debug, Default, Clone, Copy)]
pub struct JsMin;

impl Transform for JsMin {
    fn transform(&self, content: &[u8]) -> Result<Vec<u8>> {
        Minifier::new(content).run()
    }
}

/// What to do with the current pair of tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Action {
    /// Output A, copy B to A, get the next B
    Output,
    /// Copy B to A, get the next B
    Copy,
    /// Get the next B
    Skip,
}

fn is_alphanum(c: i32) -> bool {
    matches!(c, 0x61..=0x7A | 0x30..=0x39 | 0x41..=0x5A)
        || c == i32::from(b'_')
        || c == i32::from(b'$')
        || c == i32::from(b'\\')
        || c > 126
}

fn ch(c: u8) -> i32 {
    i32::from(c)
}

struct Minifier<'a> {
    input: &'a [u8],
    pos: usize,
    out: Vec<u8>,
    a: i32,
    b: i32,
    lookahead: i32,
    x: i32,
    y: i32,
}

impl<'a> Minifier<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            out: Vec::with_capacity(input.len()),
            a: EOF,
            b: EOF,
            lookahead: EOF,
            x: EOF,
            y: EOF,
        }
    }

    /// Next input character, with control characters other than newline
    /// mapped to space and carriage returns mapped to newline
    fn get(&mut self) -> i32 {
        let mut c = self.lookahead;
        self.lookahead = EOF;
        if c == EOF {
            c = match self.input.get(self.pos) {
                Some(&byte) => {
                    self.pos += 1;
                    i32::from(byte)
                }
                None => EOF,
            };
        }
        if c >= ch(b' ') || c == ch(b'\n') || c == EOF {
            c
        } else if c == ch(b'\r') {
            ch(b'\n')
        } else {
            ch(b' ')
        }
    }

    fn peek(&mut self) -> i32 {
        self.lookahead = self.get();
        self.lookahead
    }

    fn put(&mut self, c: i32) {
        if let Ok(byte) = u8::try_from(c) {
            self.out.push(byte);
        }
    }

    /// Next character with comments collapsed
    fn next(&mut self) -> Result<i32> {
        let mut c = self.get();
        if c == ch(b'/') {
            match self.peek() {
                p if p == ch(b'/') => loop {
                    c = self.get();
                    if c <= ch(b'\n') {
                        break;
                    }
                },
                p if p == ch(b'*') => {
                    self.get();
                    while c != ch(b' ') {
                        match self.get() {
                            s if s == ch(b'*') => {
                                if self.peek() == ch(b'/') {
                                    self.get();
                                    c = ch(b' ');
                                }
                            }
                            EOF => return Err(BundleError::transform("unterminated comment")),
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        self.y = self.x;
        self.x = c;
        Ok(c)
    }

    fn action(&mut self, action: Action) -> Result<()> {
        if action == Action::Output {
            self.put(self.a);
            let is_op = |c: i32| [b'+', b'-', b'*', b'/'].iter().any(|&o| c == ch(o));
            if (self.y == ch(b'\n') || self.y == ch(b' ')) && is_op(self.a) && is_op(self.b) {
                self.put(self.y);
            }
        }
        if action <= Action::Copy {
            self.a = self.b;
            if self.a == ch(b'\'') || self.a == ch(b'"') || self.a == ch(b'`') {
                self.copy_string()?;
            }
        }
        self.b = self.next()?;
        if self.b == ch(b'/') && self.regex_may_follow() {
            self.copy_regex()?;
            self.b = self.next()?;
        }
        Ok(())
    }

    fn copy_string(&mut self) -> Result<()> {
        loop {
            self.put(self.a);
            self.a = self.get();
            if self.a == self.b {
                return Ok(());
            }
            if self.a == ch(b'\\') {
                self.put(self.a);
                self.a = self.get();
            }
            if self.a == EOF {
                return Err(BundleError::transform("unterminated string literal"));
            }
        }
    }

    fn regex_may_follow(&self) -> bool {
        b"(,=:[!&|?+-~*/{\n".iter().any(|&c| self.a == ch(c))
    }

    fn copy_regex(&mut self) -> Result<()> {
        self.put(self.a);
        if self.a == ch(b'/') || self.a == ch(b'*') {
            self.put(ch(b' '));
        }
        self.put(self.b);
        loop {
            self.a = self.get();
            if self.a == ch(b'[') {
                loop {
                    self.put(self.a);
                    self.a = self.get();
                    if self.a == ch(b']') {
                        break;
                    }
                    if self.a == ch(b'\\') {
                        self.put(self.a);
                        self.a = self.get();
                    }
                    if self.a == EOF {
                        return Err(BundleError::transform(
                            "unterminated set in regular expression literal",
                        ));
                    }
                }
            } else if self.a == ch(b'/') {
                let p = self.peek();
                if p == ch(b'/') || p == ch(b'*') {
                    return Err(BundleError::transform(
                        "unterminated set in regular expression literal",
                    ));
                }
                break;
            } else if self.a == ch(b'\\') {
                self.put(self.a);
                self.a = self.get();
            }
            if self.a == EOF {
                return Err(BundleError::transform(
                    "unterminated regular expression literal",
                ));
            }
            self.put(self.a);
        }
        Ok(())
    }

    fn run(mut self) -> Result<Vec<u8>> {
        if self.peek() == BOM_LEAD {
            self.get();
            self.get();
            self.get();
        }
        self.a = ch(b'\n');
        self.action(Action::Skip)?;

        while self.a != EOF {
            let (a, b) = (self.a, self.b);
            let next = if a == ch(b' ') {
                if is_alphanum(b) { Action::Output } else { Action::Copy }
            } else if a == ch(b'\n') {
                if b"{[(+-!~".iter().any(|&c| b == ch(c)) {
                    Action::Output
                } else if b == ch(b' ') {
                    Action::Skip
                } else if is_alphanum(b) {
                    Action::Output
                } else {
                    Action::Copy
                }
            } else if b == ch(b' ') {
                if is_alphanum(a) { Action::Output } else { Action::Skip }
            } else if b == ch(b'\n') {
                if b"}])+-\"'`".iter().any(|&c| a == ch(c)) || is_alphanum(a) {
                    Action::Output
                } else {
                    Action::Skip
                }
            } else {
                Action::Output
            };
            self.action(next)?;
        }
        Ok(self.out)
    }
}
