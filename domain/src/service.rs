use tracing::debug;

use crate::sequence::{SequencePolicy, Stage, StepOutcome};
use crate::validate::validate_target_url;
use crate::{Clock, Code, CodeGenerator, CoreError, Link, LinkRepository};

/// Application service orchestrating creation of links and the visitor
/// sequence that leads to them.
///
/// Generic over repository, code generator, and clock so the whole flow can
/// be exercised against the in-memory repository and a fixed clock.
pub struct LinkService<R: LinkRepository, G: CodeGenerator, C: Clock> {
    repo: R,
    generator: G,
    clock: C,
    policy: SequencePolicy,
}

impl<R: LinkRepository, G: CodeGenerator, C: Clock> LinkService<R, G, C> {
    pub fn new(repo: R, generator: G, clock: C, policy: SequencePolicy) -> Self {
        Self {
            repo,
            generator,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &SequencePolicy {
        &self.policy
    }

    /// Draw candidates until one is not present in the repository.
    ///
    /// Unbounded: with 62^6 codes a collision is rare, and the loop only ends
    /// early on a repository error.
    pub fn generate_unique_code(&self) -> Result<Code, CoreError> {
        loop {
            let code = self.generator.next_code();
            if self.repo.get(&code)?.is_none() {
                return Ok(code);
            }
            debug!(code = %code, "generated code already taken, retrying");
        }
    }

    /// Validate `target` and store it under a fresh code.
    ///
    /// The insert decides uniqueness: if another request claimed the code
    /// between the lookup and the insert, a new code is generated.
    pub fn create(&self, target: &str) -> Result<Link, CoreError> {
        let target = validate_target_url(target)?;
        loop {
            let code = self.generate_unique_code()?;
            let link = Link::new(code, target.clone(), self.clock.now());
            match self.repo.insert(link.clone()) {
                Ok(()) => return Ok(link),
                Err(CoreError::AlreadyExists) => {
                    debug!(code = %link.code, "insert lost a race for code, regenerating");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Load a link or fail with `NotFound`.
    pub fn resolve(&self, code: &Code) -> Result<Link, CoreError> {
        self.repo.get(code)?.ok_or(CoreError::NotFound)
    }

    /// Entry point of the visitor sequence.
    pub fn enter(&self, code: &Code) -> Result<Stage, CoreError> {
        self.resolve(code)?;
        Ok(self.policy.entry())
    }

    pub fn interstitial(&self, code: &Code, step: u32) -> Result<StepOutcome, CoreError> {
        self.resolve(code)?;
        Ok(self.policy.advance(step))
    }

    /// Final stage: record the click and return the link to redirect to.
    /// The returned link carries the incremented click count.
    pub fn complete(&self, code: &Code) -> Result<Link, CoreError> {
        let mut link = self.resolve(code)?;
        self.repo.increment_clicks(code)?;
        link.clicks = link.clicks.saturating_add(1);
        Ok(link)
    }
}
