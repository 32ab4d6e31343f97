// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The contract shared by the dense and explicit sketches.

use std::fmt;
use std::io;
use std::io::Write;

use tracing::debug;

use crate::error::Error;
use crate::explicit::ExplicitSketch;
use crate::funnel::Funnel;
use crate::hll::HllSketch;

/// A mergeable distinct-value counter.
pub trait CardinalitySketch: Sized {
    /// The type of values the sketch accepts.
    type Value: ?Sized;

    /// Registers a value.
    fn put(&mut self, value: &Self::Value);

    /// Estimated number of distinct values registered.
    fn estimate(&self) -> u64;

    /// Relative standard error of [`estimate`](Self::estimate); 0 for exact sketches.
    fn relative_error(&self) -> f64 {
        0.0
    }

    /// The checksummed binary form of the sketch.
    fn serialize(&self) -> Vec<u8>;

    /// Writes [`serialize`](Self::serialize) output to `sink`, writing nothing when it is empty.
    fn write_to<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        let bytes = self.serialize();
        if !bytes.is_empty() {
            sink.write_all(&bytes)?;
        }
        Ok(())
    }

    /// A new sketch counting the union of `self` and `other`.
    fn union(&self, other: &Self) -> Result<Self, Error>;

    /// Forgets every registered value.
    fn reset(&mut self);
}

impl<F: Funnel + Clone> CardinalitySketch for HllSketch<F> {
    type Value = F::Value;

    fn put(&mut self, value: &F::Value) {
        HllSketch::put(self, value)
    }

    fn estimate(&self) -> u64 {
        HllSketch::estimate(self)
    }

    fn relative_error(&self) -> f64 {
        HllSketch::relative_error(self)
    }

    fn serialize(&self) -> Vec<u8> {
        HllSketch::serialize(self)
    }

    fn union(&self, other: &Self) -> Result<Self, Error> {
        HllSketch::union(self, other)
    }

    fn reset(&mut self) {
        HllSketch::reset(self)
    }
}

impl<F: Funnel + Clone> CardinalitySketch for ExplicitSketch<F> {
    type Value = F::Value;

    fn put(&mut self, value: &F::Value) {
        ExplicitSketch::put(self, value)
    }

    fn estimate(&self) -> u64 {
        ExplicitSketch::estimate(self)
    }

    fn serialize(&self) -> Vec<u8> {
        ExplicitSketch::serialize(self)
    }

    fn union(&self, other: &Self) -> Result<Self, Error> {
        Ok(ExplicitSketch::union(self, other))
    }

    fn reset(&mut self) {
        ExplicitSketch::reset(self)
    }
}

/// Unions any number of sketches of the same kind, or returns `None` for no input.
///
/// Union is commutative and associative, so the order of the inputs does not
/// affect the result.
///
/// # Examples
///
/// ```
/// # use hllsketch::funnel::U64Funnel;
/// # use hllsketch::hll::HllSketch;
/// # use hllsketch::sketch::merge_all;
/// let shards: Vec<_> = (0..4u64)
///     .map(|shard| {
///         let mut sketch = HllSketch::new(U64Funnel);
///         for i in 0..100 {
///             sketch.put(&(shard * 100 + i));
///         }
///         sketch
///     })
///     .collect();
/// let merged = merge_all(&shards).unwrap().unwrap();
/// assert!(merged.estimate().abs_diff(400) <= 20);
/// ```
pub fn merge_all<'a, S>(sketches: impl IntoIterator<Item = &'a S>) -> Result<Option<S>, Error>
where
    S: CardinalitySketch + Clone + 'a,
{
    let mut iter = sketches.into_iter();
    let Some(first) = iter.next() else {
        return Ok(None);
    };
    let mut merged = first.clone();
    for sketch in iter {
        merged = merged.union(sketch)?;
    }
    Ok(Some(merged))
}

/// Which binary format a buffer holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SketchKind {
    /// [`HllSketch`]
    Dense,
    /// [`ExplicitSketch`]
    Explicit,
}

impl SketchKind {
    pub const fn into_static(self) -> &'static str {
        match self {
            SketchKind::Dense => "Dense",
            SketchKind::Explicit => "Explicit",
        }
    }
}

impl fmt::Display for SketchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.into_static())
    }
}

/// Either kind of sketch behind one type.
///
/// The kind is fixed at construction; a sketch never switches between the
/// exact and approximate representation on its own.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sketch<F> {
    Dense(HllSketch<F>),
    Explicit(ExplicitSketch<F>),
}

impl<F: Funnel> Sketch<F> {
    pub fn kind(&self) -> SketchKind {
        match self {
            Sketch::Dense(_) => SketchKind::Dense,
            Sketch::Explicit(_) => SketchKind::Explicit,
        }
    }

    pub fn put(&mut self, value: &F::Value) {
        match self {
            Sketch::Dense(s) => s.put(value),
            Sketch::Explicit(s) => s.put(value),
        }
    }

    pub fn put_nullable(&mut self, value: Option<&F::Value>) {
        match self {
            Sketch::Dense(s) => s.put_nullable(value),
            Sketch::Explicit(s) => s.put_nullable(value),
        }
    }

    pub fn put_hash(&mut self, hash: u64) {
        match self {
            Sketch::Dense(s) => s.put_hash(hash),
            Sketch::Explicit(s) => s.put_hash(hash),
        }
    }

    pub fn estimate(&self) -> u64 {
        match self {
            Sketch::Dense(s) => s.estimate(),
            Sketch::Explicit(s) => s.estimate(),
        }
    }

    pub fn relative_error(&self) -> f64 {
        match self {
            Sketch::Dense(s) => s.relative_error(),
            Sketch::Explicit(s) => s.relative_error(),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Sketch::Dense(s) => s.serialize(),
            Sketch::Explicit(s) => s.serialize(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Sketch::Dense(s) => s.reset(),
            Sketch::Explicit(s) => s.reset(),
        }
    }

    /// Unions two sketches of the same kind.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the kinds differ, or if two dense sketches differ in `lg_m`.
    pub fn union(&self, other: &Self) -> Result<Self, Error>
    where
        F: Clone,
    {
        match (self, other) {
            (Sketch::Dense(a), Sketch::Dense(b)) => a.union(b).map(Sketch::Dense),
            (Sketch::Explicit(a), Sketch::Explicit(b)) => Ok(Sketch::Explicit(a.union(b))),
            _ => {
                debug!(
                    left = %self.kind(),
                    right = %other.kind(),
                    "rejecting union of different sketch kinds"
                );
                Err(Error::invalid_argument(format!(
                    "cannot union sketches of different kinds: {} and {}",
                    self.kind(),
                    other.kind()
                ))
                .with_context("left", self.kind())
                .with_context("right", other.kind()))
            }
        }
    }

    /// Deserializes `bytes` as a sketch of the given kind.
    ///
    /// The kind must be supplied by the caller: a dense prefix byte can take the
    /// same value as the explicit marker.
    pub fn deserialize(kind: SketchKind, bytes: &[u8], funnel: F) -> Result<Self, Error> {
        match kind {
            SketchKind::Dense => HllSketch::deserialize(bytes, funnel).map(Sketch::Dense),
            SketchKind::Explicit => ExplicitSketch::deserialize(bytes, funnel).map(Sketch::Explicit),
        }
    }
}

impl<F: Funnel + Clone> CardinalitySketch for Sketch<F> {
    type Value = F::Value;

    fn put(&mut self, value: &F::Value) {
        Sketch::put(self, value)
    }

    fn estimate(&self) -> u64 {
        Sketch::estimate(self)
    }

    fn relative_error(&self) -> f64 {
        Sketch::relative_error(self)
    }

    fn serialize(&self) -> Vec<u8> {
        Sketch::serialize(self)
    }

    fn union(&self, other: &Self) -> Result<Self, Error> {
        Sketch::union(self, other)
    }

    fn reset(&mut self) {
        Sketch::reset(self)
    }
}

impl<F> From<HllSketch<F>> for Sketch<F> {
    fn from(sketch: HllSketch<F>) -> Self {
        Sketch::Dense(sketch)
    }
}

impl<F> From<ExplicitSketch<F>> for Sketch<F> {
    fn from(sketch: ExplicitSketch<F>) -> Self {
        Sketch::Explicit(sketch)
    }
}
