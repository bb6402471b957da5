//! Sequential-counter cardinality encodings (Sinz 2005).
//!
//! Every function takes its literals as opaque [`Lit`]s and returns a fresh
//! [`Constraint`]; auxiliary counters are drawn from the [`Pool`] under the
//! given [`Namespace`], which is claimed even when the bound turns out to be
//! degenerate and no counter is needed.

use log::*;

use crate::lit::{Constraint, Lit};
use crate::pool::{Namespace, Pool};
use crate::Error;

/// At least one of `lits` is true. Empty `lits` gives the empty clause.
pub fn at_least_one(lits: &[Lit]) -> Constraint {
    let mut c = Constraint::trivial();
    c.push(lits.iter().copied());
    c
}

/// At most one of `lits` is true, using a chain of `n-1` flags where `s[i]`
/// means "some literal among the first i+1 is true".
pub fn at_most_one(pool: &mut Pool, lits: &[Lit], ns: Namespace) -> Result<Constraint, Error> {
    let n = lits.len();
    if n <= 1 {
        pool.reserve(ns)?;
        return Ok(Constraint::trivial());
    }

    let s = pool.counters(ns, n - 1, 1)?.into_iter().map(|row| row[0]).collect::<Vec<_>>();

    let mut c = Constraint::trivial();
    c.push(vec![!lits[0], s[0]]);
    for i in 1..(n - 1) {
        c.push(vec![!lits[i], s[i]]);
        c.push(vec![!lits[i], !s[i - 1]]);
        c.push(vec![!s[i - 1], s[i]]);
    }
    c.push(vec![!lits[n - 1], !s[n - 2]]);
    Ok(c)
}

pub fn exactly_one(pool: &mut Pool, lits: &[Lit], ns: Namespace) -> Result<Constraint, Error> {
    Ok(at_least_one(lits).and(at_most_one(pool, lits, ns)?))
}

/// At most `k` of `lits` are true.
///
/// For `1 <= k < n` this is the sequential counter with `s[i][j]` meaning
/// "at least j+1 of the first i+1 literals are true". `k == 0` forbids every
/// literal and `k >= n` holds trivially.
pub fn at_most_k(pool: &mut Pool, lits: &[Lit], k: usize, ns: Namespace) -> Result<Constraint, Error> {
    let n = lits.len();
    if k >= n {
        pool.reserve(ns)?;
        return Ok(Constraint::trivial());
    }
    if k == 0 {
        pool.reserve(ns)?;
        return Ok(lits.iter().map(|l| vec![!*l]).collect());
    }

    // 1 <= k < n, so n >= 2 and the block has at least one row.
    let s = pool.counters(ns, n - 1, k)?;

    let mut c = Constraint::trivial();
    c.push(vec![!lits[0], s[0][0]]);
    for j in 1..k {
        c.push(vec![!s[0][j]]);
    }
    for i in 1..(n - 1) {
        c.push(vec![!lits[i], s[i][0]]);
        c.push(vec![!s[i - 1][0], s[i][0]]);
        c.push(vec![!lits[i], !s[i - 1][k - 1]]);
        for j in 1..k {
            c.push(vec![!lits[i], !s[i - 1][j - 1], s[i][j]]);
            c.push(vec![!s[i - 1][j], s[i][j]]);
        }
    }
    c.push(vec![!lits[n - 1], !s[n - 2][k - 1]]);
    Ok(c)
}

/// At least `k` of `lits` are true: at most `n-k` of the negated literals.
pub fn at_least_k(pool: &mut Pool, lits: &[Lit], k: usize, ns: Namespace) -> Result<Constraint, Error> {
    let n = lits.len();
    if k > n {
        pool.reserve(ns)?;
        return Ok(Constraint::contradiction());
    }
    let negated = lits.iter().map(|l| !*l).collect::<Vec<_>>();
    at_most_k(pool, &negated, n - k, ns)
}

pub fn exactly_k(pool: &mut Pool, lits: &[Lit], k: usize, ns: Namespace) -> Result<Constraint, Error> {
    let upper = at_most_k(pool, lits, k, ns.upper())?;
    let lower = at_least_k(pool, lits, k, ns.lower())?;
    Ok(upper.and(lower))
}

/// A bound on the number of true literals, as emitted by the model builder.
#[derive(Clone, Debug)]
pub struct CardinalityConstraint {
    pub namespace: Namespace,
    pub lits: Vec<Lit>,
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl CardinalityConstraint {
    pub fn exactly(namespace: Namespace, lits: Vec<Lit>, k: usize) -> Self {
        CardinalityConstraint { namespace, lits, min: Some(k), max: Some(k) }
    }

    pub fn at_most(namespace: Namespace, lits: Vec<Lit>, k: usize) -> Self {
        CardinalityConstraint { namespace, lits, min: None, max: Some(k) }
    }

    pub fn between(namespace: Namespace, lits: Vec<Lit>, min: usize, max: usize) -> Self {
        CardinalityConstraint { namespace, lits, min: Some(min), max: Some(max) }
    }
}

/// Normalizes the bounds of `card` and picks an encoding for it.
pub fn encode(pool: &mut Pool, mut card: CardinalityConstraint) -> Result<Constraint, Error> {
    if card.min == Some(0) {
        card.min = None;
    }
    if card.max.map(|m| m >= card.lits.len()) == Some(true) {
        card.max = None;
    }

    debug!("CONSTRAINT: {} over {} lits min={:?} max={:?}", card.namespace, card.lits.len(), card.min, card.max);

    let ns = card.namespace;
    match (card.min, card.max) {
        (None, None) => {
            warn!(" - {}: no min or max! Constraint has no effect.", ns);
            pool.reserve(ns)?;
            Ok(Constraint::trivial())
        }
        (Some(1), Some(1)) => {
            debug!(" - exactly one");
            exactly_one(pool, &card.lits, ns)
        }
        (None, Some(1)) => {
            debug!(" - at most one");
            at_most_one(pool, &card.lits, ns)
        }
        (Some(min), Some(max)) if min == max => {
            debug!(" - exactly k");
            exactly_k(pool, &card.lits, min, ns)
        }
        (min, max) => {
            let mut c = Constraint::trivial();
            if let Some(min) = min {
                debug!(" - sequential counter on min");
                c.extend(at_least_k(pool, &card.lits, min, ns.lower())?);
            }
            if let Some(max) = max {
                debug!(" - sequential counter on max");
                c.extend(at_most_k(pool, &card.lits, max, ns.upper())?);
            }
            Ok(c)
        }
    }
}
