//! C-like preprocessor: include resolution, object/function-like macros,
//! conditional compilation, and line tracking ahead of lexing.

mod cond_eval;
mod directive;
mod macro_table;
mod stream;

pub use directive::Directive;
pub use macro_table::{MacroDef, MacroTable};

use cond_eval::CondEvaluator;
use fcx_common::{FcxError, Position, Span};
use hashbrown::HashSet;
use stream::CharStream;

/// Maximum nesting depth for both `#if`/`#ifdef` conditionals and `#include`
/// chains. Exceeding either is a fatal preprocessor error.
pub const MAX_STACK_DEPTH: usize = 64;

/// Resolves `#include` paths to source text. The driver supplies a
/// filesystem-backed implementation; tests supply an in-memory one.
pub trait FileLoader {
    fn load(&self, path: &str, is_system: bool) -> Result<String, FcxError>;
}

struct ConditionalFrame {
    /// Whether the currently active branch's body should be emitted.
    taking: bool,
    /// Whether any branch in this `#if`/`#elif*`/`#else` chain has already matched.
    any_taken: bool,
    /// Whether an `#else` has already been seen for this chain.
    saw_else: bool,
}

pub struct Preprocessor<'l> {
    macros: MacroTable,
    conditional_stack: Vec<ConditionalFrame>,
    include_stack: Vec<String>,
    pragma_once_files: HashSet<String>,
    loader: &'l dyn FileLoader,
}

impl<'l> Preprocessor<'l> {
    pub fn new(loader: &'l dyn FileLoader) -> Self {
        Self {
            macros: MacroTable::new(),
            conditional_stack: Vec::new(),
            include_stack: Vec::new(),
            pragma_once_files: HashSet::new(),
            loader,
        }
    }

    pub fn define(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.macros.define(name.into(), None, body.into());
    }

    fn currently_emitting(&self) -> bool {
        self.conditional_stack.iter().all(|frame| frame.taking)
    }

    /// Preprocesses `source` (the file named `file_name`, with id `file_id`
    /// for span tracking), expanding includes and macros and resolving
    /// conditionals. Returns the flattened text ready for the lexer.
    pub fn process(&mut self, source: &str, file_name: &str, file_id: u32) -> Result<String, FcxError> {
        if self.pragma_once_files.contains(file_name) {
            return Ok(String::new());
        }
        if self.include_stack.len() >= MAX_STACK_DEPTH {
            return Err(FcxError::preprocessor(
                format!("include depth exceeded {MAX_STACK_DEPTH} (possible cycle including `{file_name}`)"),
                Span::single(Position::start(), file_id),
            ));
        }
        if self.include_stack.iter().any(|f| f == file_name) {
            return Err(FcxError::preprocessor(format!("circular include of `{file_name}`"), Span::single(Position::start(), file_id)));
        }
        self.include_stack.push(file_name.to_string());
        let result = self.process_inner(source, file_id);
        self.include_stack.pop();
        result
    }

    fn process_inner(&mut self, source: &str, file_id: u32) -> Result<String, FcxError> {
        let mut output = String::with_capacity(source.len());
        let mut stream = CharStream::new(source);
        let conditional_depth_at_entry = self.conditional_stack.len();

        while !stream.is_at_end() {
            let line_start_pos = stream.position();
            let line = stream.skip_to_line_end();
            let trimmed = line.trim_start();

            if let Some(rest) = trimmed.strip_prefix('#') {
                let span = Span::single(line_start_pos, file_id);
                self.handle_directive(rest, span, &mut output)?;
                // The directive line itself is consumed, but still counts
                // towards the source's line numbering: emit a blank line in
                // its place rather than dropping it, so diagnostics further
                // down the pipeline still point at the right source line.
                output.push('\n');
                continue;
            }

            if self.currently_emitting() {
                output.push_str(&self.macros.expand_once(&line));
            }
            // An inactive-conditional line is replaced with a blank line for
            // the same line-counting reason as a consumed directive above.
            output.push('\n');
        }

        if self.conditional_stack.len() != conditional_depth_at_entry {
            return Err(FcxError::preprocessor("unterminated #if (missing #endif)", Span::single(Position::start(), file_id)));
        }
        Ok(output)
    }

    fn handle_directive(&mut self, rest: &str, span: Span, output: &mut String) -> Result<(), FcxError> {
        let Some(directive) = Directive::parse(rest) else {
            if self.currently_emitting() {
                return Err(FcxError::preprocessor(format!("unrecognized directive `#{rest}`"), span));
            }
            return Ok(());
        };

        match directive {
            Directive::Ifdef { name } => self.push_conditional(self.macros.is_defined(&name), span)?,
            Directive::Ifndef { name } => self.push_conditional(!self.macros.is_defined(&name), span)?,
            Directive::If { expr } => {
                let value = self.evaluate_if(&expr, span)?;
                self.push_conditional(value != 0, span)?;
            }
            Directive::Elif { expr } => {
                self.handle_elif(&expr, span)?;
            }
            Directive::Else => self.handle_else(span)?,
            Directive::Endif => self.pop_conditional(span)?,
            Directive::PragmaOnce => {}
            Directive::Define { name, params, body } if self.currently_emitting() => {
                self.macros.define(name, params, body);
            }
            Directive::Undef { name } if self.currently_emitting() => {
                self.macros.undef(&name);
            }
            Directive::Include { path, is_system } if self.currently_emitting() => {
                let nested_source = self.loader.load(&path, is_system)?;
                let nested = self.process(&nested_source, &path, span.file_id)?;
                output.push_str(&nested);
            }
            Directive::Error { message } if self.currently_emitting() => {
                return Err(FcxError::preprocessor(message, span));
            }
            Directive::Warning { message } if self.currently_emitting() => {
                log::warn!("{span}: {message}");
            }
            _ => {}
        }
        Ok(())
    }

    fn evaluate_if(&self, expr: &str, span: Span) -> Result<i64, FcxError> {
        CondEvaluator::evaluate(expr, span, |name| self.macros.is_defined(name))
    }

    fn push_conditional(&mut self, taken: bool, span: Span) -> Result<(), FcxError> {
        if self.conditional_stack.len() >= MAX_STACK_DEPTH {
            return Err(FcxError::preprocessor(format!("#if nesting exceeded {MAX_STACK_DEPTH}"), span));
        }
        let parent_emitting = self.currently_emitting();
        self.conditional_stack.push(ConditionalFrame {
            taking: parent_emitting && taken,
            any_taken: parent_emitting && taken,
            saw_else: false,
        });
        Ok(())
    }

    fn handle_elif(&mut self, expr: &str, span: Span) -> Result<(), FcxError> {
        let parent_emitting = self.conditional_stack.len() < 2 || self.conditional_stack[..self.conditional_stack.len() - 1].iter().all(|f| f.taking);
        let value = self.evaluate_if(expr, span)?;
        let frame = self
            .conditional_stack
            .last_mut()
            .ok_or_else(|| FcxError::preprocessor("#elif without matching #if", span))?;
        if frame.saw_else {
            return Err(FcxError::preprocessor("#elif after #else", span));
        }
        if frame.any_taken {
            frame.taking = false;
        } else {
            frame.taking = parent_emitting && value != 0;
            frame.any_taken = frame.taking;
        }
        Ok(())
    }

    fn handle_else(&mut self, span: Span) -> Result<(), FcxError> {
        let parent_emitting = self.conditional_stack.len() < 2 || self.conditional_stack[..self.conditional_stack.len() - 1].iter().all(|f| f.taking);
        let frame = self
            .conditional_stack
            .last_mut()
            .ok_or_else(|| FcxError::preprocessor("#else without matching #if", span))?;
        if frame.saw_else {
            return Err(FcxError::preprocessor("duplicate #else", span));
        }
        frame.saw_else = true;
        frame.taking = parent_emitting && !frame.any_taken;
        frame.any_taken = true;
        Ok(())
    }

    fn pop_conditional(&mut self, span: Span) -> Result<(), FcxError> {
        if self.conditional_stack.pop().is_none() {
            return Err(FcxError::preprocessor("#endif without matching #if", span));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticLoader;
    impl FileLoader for StaticLoader {
        fn load(&self, path: &str, _is_system: bool) -> Result<String, FcxError> {
            match path {
                "inc.fcx" => Ok("define FROM_INCLUDE 7\n".to_string()),
                "cycle.fcx" => Ok("include \"cycle.fcx\"\n".to_string()),
                other => Err(FcxError::preprocessor(format!("no such file: {other}"), Span::single(Position::start(), 0))),
            }
        }
    }

    fn run(source: &str) -> String {
        let loader = StaticLoader;
        let mut pp = Preprocessor::new(&loader);
        pp.process(source, "main.fcx", 0).unwrap()
    }

    #[test]
    fn expands_object_macro_outside_directives() {
        let out = run("define N 3\nlet x = N\n");
        assert!(out.contains("let x = 3"));
    }

    #[test]
    fn if_zero_skips_its_body() {
        let out = run("if 0\nlet x = 1\nendif\n");
        assert!(!out.contains("let x = 1"));
    }

    #[test]
    fn if_else_picks_the_right_branch() {
        let out = run("if 0\nlet x = 1\nelse\nlet x = 2\nendif\n");
        assert!(out.contains("let x = 2"));
        assert!(!out.contains("let x = 1"));
    }

    #[test]
    fn elif_chain_picks_first_true_branch() {
        let out = run("if 0\nlet x = 1\nelif 1\nlet x = 2\nelif 1\nlet x = 3\nendif\n");
        assert!(out.contains("let x = 2"));
        assert!(!out.contains("let x = 3"));
    }

    #[test]
    fn nested_conditionals_respect_the_outer_frame() {
        let out = run("if 0\nif 1\nlet x = 1\nendif\nendif\n");
        assert!(!out.contains("let x = 1"));
    }

    #[test]
    fn unterminated_if_is_an_error() {
        let loader = StaticLoader;
        let mut pp = Preprocessor::new(&loader);
        assert!(pp.process("if 1\nlet x = 1\n", "main.fcx", 0).is_err());
    }

    #[test]
    fn stray_endif_is_an_error() {
        let loader = StaticLoader;
        let mut pp = Preprocessor::new(&loader);
        assert!(pp.process("endif\n", "main.fcx", 0).is_err());
    }

    #[test]
    fn include_pulls_in_nested_macro_definitions() {
        let out = run("include \"inc.fcx\"\nlet x = FROM_INCLUDE\n");
        assert!(out.contains("let x = 7"));
    }

    #[test]
    fn circular_include_is_rejected() {
        let loader = StaticLoader;
        let mut pp = Preprocessor::new(&loader);
        let err = pp.process("include \"cycle.fcx\"\n", "cycle.fcx", 0);
        assert!(err.is_err());
    }

    #[test]
    fn ifdef_and_ifndef_check_macro_table() {
        let out = run("define HAS_X 1\nifdef HAS_X\nlet a = 1\nendif\nifndef HAS_X\nlet b = 2\nendif\n");
        assert!(out.contains("let a = 1"));
        assert!(!out.contains("let b = 2"));
    }
}
