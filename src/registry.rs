//! Enrollment registry for reference images.
//!
//! The registry owns the enrolled collection: identifier assignment,
//! insertion order, and lifecycle (clear, individual removal). The matcher
//! never mutates it; `identify` consumes a snapshot, so enrolling or
//! clearing during an in-flight identification cannot disturb the scan.

use std::time::SystemTime;

use crate::normalize::ImageSource;
use crate::util::{PrintMatchError, PrintMatchResult};

/// One enrolled reference image.
///
/// Immutable once created. The registry owns the backing image storage.
#[derive(Clone)]
pub struct EnrolledReference {
    id: String,
    image: ImageSource,
    enrolled_at: SystemTime,
}

impl EnrolledReference {
    /// Creates an entry with an externally assigned id.
    ///
    /// Intended for collaborators that persist references elsewhere and
    /// rebuild the registry through [`ReferenceRegistry::from_entries`].
    pub fn new(id: impl Into<String>, image: ImageSource, enrolled_at: SystemTime) -> Self {
        Self {
            id: id.into(),
            image,
            enrolled_at,
        }
    }

    /// Returns the opaque unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the stored encoded image.
    pub fn image(&self) -> &ImageSource {
        &self.image
    }

    /// Returns the enrollment time.
    pub fn enrolled_at(&self) -> SystemTime {
        self.enrolled_at
    }
}

/// Ordered, owned collection of enrolled references.
///
/// Enrollment order is preserved and defines the tie-break order during
/// identification.
#[derive(Default)]
pub struct ReferenceRegistry {
    entries: Vec<EnrolledReference>,
    next_id: u64,
}

impl ReferenceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from existing entries, keeping their order.
    ///
    /// Ids must be unique; the first duplicate aborts construction.
    pub fn from_entries(
        entries: impl IntoIterator<Item = EnrolledReference>,
    ) -> PrintMatchResult<Self> {
        let mut registry = Self::new();
        for entry in entries {
            if registry.get(entry.id()).is_some() {
                return Err(PrintMatchError::DuplicateId {
                    id: entry.id.clone(),
                });
            }
            registry.entries.push(entry);
        }
        Ok(registry)
    }

    /// Enrolls an image under a fresh registry-assigned id.
    pub fn enroll(&mut self, image: ImageSource) -> &EnrolledReference {
        let id = loop {
            self.next_id += 1;
            let candidate = format!("ref-{}", self.next_id);
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };
        self.entries.push(EnrolledReference {
            id,
            image,
            enrolled_at: SystemTime::now(),
        });
        self.entries.last().expect("entry was just pushed")
    }

    /// Returns the entry with `id`, if enrolled.
    pub fn get(&self, id: &str) -> Option<&EnrolledReference> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Removes and returns the entry with `id`.
    pub fn remove(&mut self, id: &str) -> Option<EnrolledReference> {
        let idx = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(idx))
    }

    /// Removes every enrolled reference.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of enrolled references.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is enrolled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the enrolled references in enrollment order.
    pub fn entries(&self) -> &[EnrolledReference] {
        &self.entries
    }

    /// Returns an owned copy of the current entries.
    ///
    /// This is the stable view handed to `identify`; later registry
    /// mutations do not affect it. Byte-backed images share their payload,
    /// so the copy is cheap.
    pub fn snapshot(&self) -> Vec<EnrolledReference> {
        self.entries.clone()
    }
}
