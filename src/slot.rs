/// A single reusable output region. Holds at most one artifact; installing a
/// new one drops the previous.
#[derive(Debug)]
pub struct DisplaySlot<A> {
    artifact: Option<A>,
    generation: u64,
}

impl<A> Default for DisplaySlot<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> DisplaySlot<A> {
    pub fn new() -> Self {
        Self {
            artifact: None,
            generation: 0,
        }
    }

    /// Clear the prior artifact and install `artifact` in its place.
    pub fn replace(&mut self, artifact: A) -> Option<A> {
        self.generation += 1;
        self.artifact.replace(artifact)
    }

    pub fn current(&self) -> Option<&A> {
        self.artifact.as_ref()
    }

    pub fn len(&self) -> usize {
        usize::from(self.artifact.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.artifact.is_none()
    }

    /// Number of artifacts installed so far
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
