#![allow(missing_docs)]
#![allow(dead_code)]

use std::{cell::Cell, rc::Rc};

/// Value whose live instances are counted, for observing what a buffer keeps
/// alive.
#[derive(Debug, Default, Clone)]
pub struct Tracked(pub Option<Rc<Cell<()>>>);

impl Tracked {
    pub fn new(token: &Rc<Cell<()>>) -> Self {
        Self(Some(Rc::clone(token)))
    }
}

/// Number of `Tracked` values (plus the caller's own handle) sharing `token`.
pub fn live(token: &Rc<Cell<()>>) -> usize {
    Rc::strong_count(token)
}
