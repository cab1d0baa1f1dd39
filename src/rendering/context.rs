//! Rendering context: the backend plus the currently bound program.

use super::backend::RenderBackend;

/// Owns a backend and remembers which program it has active
pub struct RenderContext<B: RenderBackend> {
    backend: B,
    current_program: Option<B::Program>,
}

impl<B: RenderBackend> RenderContext<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current_program: None,
        }
    }

    /// Make `program` active, skipping the backend call if it already is
    pub fn bind(&mut self, program: B::Program) {
        if self.current_program != Some(program) {
            self.backend.use_program(program);
            self.current_program = Some(program);
        }
    }

    pub fn current_program(&self) -> Option<B::Program> {
        self.current_program
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::testing::{Call, RecordingBackend};
    use crate::rendering::ShaderStage;

    fn program(ctx: &mut RenderContext<RecordingBackend>, label: &str) -> u32 {
        let backend = ctx.backend_mut();
        let vs = backend.compile(ShaderStage::Vertex, "vs").unwrap();
        let fs = backend.compile(ShaderStage::Fragment, "fs").unwrap();
        backend.link(label, &vs, &fs).unwrap()
    }

    #[test]
    fn test_bind_is_idempotent() {
        let mut ctx = RenderContext::new(RecordingBackend::default());
        let a = program(&mut ctx, "a");

        ctx.bind(a);
        ctx.bind(a);
        ctx.bind(a);

        assert_eq!(ctx.backend().count(|c| matches!(c, Call::UseProgram(_))), 1);
        assert_eq!(ctx.current_program(), Some(a));
    }

    #[test]
    fn test_bind_switches_between_programs() {
        let mut ctx = RenderContext::new(RecordingBackend::default());
        let a = program(&mut ctx, "a");
        let b = program(&mut ctx, "b");

        ctx.bind(a);
        ctx.bind(b);
        ctx.bind(b);
        ctx.bind(a);

        let uses: Vec<_> = ctx
            .backend()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::UseProgram(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(uses, vec![a, b, a]);
    }
}
