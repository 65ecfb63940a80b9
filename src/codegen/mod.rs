//! Java source generation
//!
//! A structural pretty-printer over a checked AST. Name and type spellings
//! come from the [`Analysis`] bindings' `external` names, so `print`
//! becomes `System.out.println` and `Integer` becomes `int`. The whole
//! program lands in one `Main` class whose `main(String[] args)` bootstrap
//! exits with the program's `main()` result.

use crate::ast::{BinaryOp, Expr, Literal, Method, Source, Stmt};
use crate::check::Analysis;
use crate::types;
use std::fmt::{self, Write};

/// Render `source` as Java text.
pub fn generate(source: &Source, analysis: &Analysis) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = emit(source, analysis, &mut out);
    out
}

/// Render `source` as Java into `out`. Fails only if the sink does.
pub fn emit<W: Write>(source: &Source, analysis: &Analysis, out: &mut W) -> fmt::Result {
    Generator {
        analysis,
        out,
        indent: 0,
    }
    .source(source)
}

struct Generator<'a, W: Write> {
    analysis: &'a Analysis,
    out: &'a mut W,
    indent: usize,
}

impl<W: Write> Generator<'_, W> {
    fn source(&mut self, source: &Source) -> fmt::Result {
        self.line("public class Main {")?;
        self.blank()?;
        self.indent += 1;

        for field in &source.fields {
            let ty = self
                .analysis
                .variable(field.id)
                .map(|v| v.ty.external.as_str())
                .unwrap_or("var");
            match &field.value {
                Some(value) => {
                    let value = self.expr(value);
                    self.line(&format!("{ty} {} = {value};", field.name))?;
                }
                None => self.line(&format!("{ty} {};", field.name))?,
            }
        }
        if !source.fields.is_empty() {
            self.blank()?;
        }

        self.line("public static void main(String[] args) {")?;
        self.indent += 1;
        self.line("System.exit(new Main().main());")?;
        self.indent -= 1;
        self.line("}")?;

        for method in &source.methods {
            self.blank()?;
            self.method(method)?;
        }

        self.indent -= 1;
        self.blank()?;
        self.line("}")
    }

    fn method(&mut self, method: &Method) -> fmt::Result {
        let function = self.analysis.function(method.id);
        let ret = match function {
            // A method declared Nil is a Java void method.
            Some(f) if f.ret.is(types::NIL) => "void".to_string(),
            Some(f) => f.ret.external.clone(),
            None => "var".to_string(),
        };

        let mut header = format!("{ret} {}(", method.name);
        for (i, parameter) in method.parameters.iter().enumerate() {
            if i > 0 {
                header.push_str(", ");
            }
            let ty = function
                .and_then(|f| f.parameters.get(i))
                .map(|t| t.external.as_str())
                .unwrap_or("var");
            let _ = write!(header, "{ty} {}", parameter.name);
        }
        header.push_str(") {");

        self.line(&header)?;
        self.block(&method.statements)?;
        self.line("}")
    }

    // ==================== STATEMENTS ====================

    fn block(&mut self, statements: &[Stmt]) -> fmt::Result {
        self.indent += 1;
        for statement in statements {
            self.statement(statement)?;
        }
        self.indent -= 1;
        Ok(())
    }

    fn statement(&mut self, statement: &Stmt) -> fmt::Result {
        match statement {
            Stmt::Expression { expr } => {
                let expr = self.expr(expr);
                self.line(&format!("{expr};"))
            }
            Stmt::Declaration {
                id, name, value, ..
            } => {
                let ty = self
                    .analysis
                    .variable(*id)
                    .map(|v| v.ty.external.as_str())
                    .unwrap_or("var");
                match value {
                    Some(value) => {
                        let value = self.expr(value);
                        self.line(&format!("{ty} {name} = {value};"))
                    }
                    None => self.line(&format!("{ty} {name};")),
                }
            }
            Stmt::Assignment { receiver, value } => {
                let receiver = self.expr(receiver);
                let value = self.expr(value);
                self.line(&format!("{receiver} = {value};"))
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.expr(condition);
                self.line(&format!("if ({condition}) {{"))?;
                self.block(then_branch)?;
                if !else_branch.is_empty() {
                    self.line("} else {")?;
                    self.block(else_branch)?;
                }
                self.line("}")
            }
            Stmt::For {
                name,
                iterable,
                body,
            } => {
                let iterable = self.expr(iterable);
                self.line(&format!("for (int {name} : {iterable}) {{"))?;
                self.block(body)?;
                self.line("}")
            }
            Stmt::While { condition, body } => {
                let condition = self.expr(condition);
                self.line(&format!("while ({condition}) {{"))?;
                self.block(body)?;
                self.line("}")
            }
            Stmt::Return { value } => {
                let value = self.expr(value);
                self.line(&format!("return {value};"))
            }
        }
    }

    // ==================== EXPRESSIONS ====================

    fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal { value, .. } => literal(value),
            Expr::Group { expr, .. } => format!("({})", self.expr(expr)),
            Expr::Binary {
                op, left, right, ..
            } => {
                let op = match op {
                    BinaryOp::And => "&&",
                    BinaryOp::Or => "||",
                    other => other.as_str(),
                };
                format!("{} {op} {}", self.expr(left), self.expr(right))
            }
            Expr::Access { id, receiver, name } => {
                let name = self
                    .analysis
                    .variable(*id)
                    .map(|v| v.external.clone())
                    .unwrap_or_else(|| name.clone());
                match receiver {
                    Some(receiver) => format!("{}.{name}", self.expr(receiver)),
                    None => name,
                }
            }
            Expr::Call {
                id,
                receiver,
                name,
                arguments,
            } => {
                let name = self
                    .analysis
                    .function(*id)
                    .map(|f| f.external.clone())
                    .unwrap_or_else(|| name.clone());
                let arguments = arguments
                    .iter()
                    .map(|a| self.expr(a))
                    .collect::<Vec<_>>()
                    .join(", ");
                match receiver {
                    Some(receiver) => format!("{}.{name}({arguments})", self.expr(receiver)),
                    None => format!("{name}({arguments})"),
                }
            }
        }
    }

    // ==================== OUTPUT ====================

    fn line(&mut self, text: &str) -> fmt::Result {
        for _ in 0..self.indent {
            self.out.write_str("    ")?;
        }
        self.out.write_str(text)?;
        self.out.write_char('\n')
    }

    fn blank(&mut self) -> fmt::Result {
        self.out.write_char('\n')
    }
}

fn literal(value: &Literal) -> String {
    match value {
        Literal::Nil => "null".to_string(),
        Literal::Boolean(b) => b.to_string(),
        Literal::Character(c) => format!("'{}'", escape(*c)),
        Literal::String(s) => {
            let escaped: String = s.chars().map(escape).collect();
            format!("\"{escaped}\"")
        }
        Literal::Integer(v) => v.to_string(),
        Literal::Decimal(v) => v.to_string(),
    }
}

/// Re-escape a character for Java source text.
fn escape(c: char) -> String {
    match c {
        '\u{8}' => "\\b".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\'' => "\\'".to_string(),
        '"' => "\\\"".to_string(),
        '\\' => "\\\\".to_string(),
        other => other.to_string(),
    }
}
