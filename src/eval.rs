//! AST execution: statements against a lexically scoped environment
//! chain, dynamic dispatch over the runtime value variants, and
//! class/instance/method binding.

use crate::ast::{Expr, NodeId, Stmt};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::token::{Token, TokenKind};
use crate::value::{stringify, ClassData, FunctionData, InstanceData, NativeFunctionData, SequenceData, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Where `print` sends its bytes. Production runs write straight to
/// stdout; tests capture into a shared buffer so they can assert on
/// program output without touching the process's real stdout.
enum Output {
    Stdout,
    Captured(Rc<RefCell<Vec<u8>>>),
}

impl Output {
    fn write(&self, text: &str) {
        match self {
            Output::Stdout => print!("{text}"),
            Output::Captured(buf) => buf.borrow_mut().extend_from_slice(text.as_bytes()),
        }
    }
}

/// Non-local control transfer out of a function body. Every statement
/// evaluator propagates this with `?` instead of unwinding through the
/// host's general error/panic machinery; `Interpreter::call_function`
/// is the only place that catches `Return`.
enum Signal {
    Return(Value),
    Error(RuntimeError),
}

impl From<RuntimeError> for Signal {
    fn from(err: RuntimeError) -> Self {
        Signal::Error(err)
    }
}

type ExecResult = Result<(), Signal>;

pub struct Interpreter {
    pub globals: Rc<Environment>,
    environment: Rc<Environment>,
    locals: HashMap<NodeId, usize>,
    output: Output,
}

impl Interpreter {
    pub fn new(locals: HashMap<NodeId, usize>) -> Self {
        Interpreter::build(locals, Output::Stdout)
    }

    /// Builds an interpreter whose `print` output is captured in a
    /// shared buffer instead of going to stdout, for tests.
    pub fn with_capture(locals: HashMap<NodeId, usize>) -> (Self, Rc<RefCell<Vec<u8>>>) {
        let buf = Rc::new(RefCell::new(Vec::new()));
        (Interpreter::build(locals, Output::Captured(Rc::clone(&buf))), buf)
    }

    fn build(locals: HashMap<NodeId, usize>, output: Output) -> Self {
        let globals = Environment::new();
        define_globals(&globals);
        Interpreter {
            globals: Rc::clone(&globals),
            environment: globals,
            locals,
            output,
        }
    }

    /// Swaps in a fresh resolution map for a new batch of statements,
    /// keeping the same global/lexical environment. Used by the REPL
    /// driver, where each line is lexed, parsed and resolved on its
    /// own but variables persist across lines.
    pub fn set_locals(&mut self, locals: HashMap<NodeId, usize>) {
        self.locals = locals;
    }

    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in stmts {
            match self.execute(stmt) {
                Ok(()) => {}
                Err(Signal::Return(_)) => {}
                Err(Signal::Error(err)) => return Err(err),
            }
        }
        Ok(())
    }

    // ---- statements ----

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Block(stmts) => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(stmts, scope)
            }
            Stmt::Class(class_stmt) => {
                self.environment.define(class_stmt.name.lexeme.clone(), Value::Nil);
                let mut methods = HashMap::new();
                for method in &class_stmt.methods {
                    let data = FunctionData {
                        declaration: Rc::clone(method),
                        closure: Rc::clone(&self.environment),
                        is_initializer: method.name.lexeme == "init",
                    };
                    methods.insert(method.name.lexeme.clone(), Rc::new(data));
                }
                let class_value = Value::Class(Rc::new(ClassData {
                    name: class_stmt.name.lexeme.clone(),
                    methods,
                }));
                self.environment.assign(&class_stmt.name, class_value)?;
                Ok(())
            }
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Function(func_stmt) => {
                let data = FunctionData {
                    declaration: Rc::clone(func_stmt),
                    closure: Rc::clone(&self.environment),
                    is_initializer: false,
                };
                self.environment.define(func_stmt.name.lexeme.clone(), Value::Function(Rc::new(data)));
                Ok(())
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::Return { value, .. } => {
                let result = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Err(Signal::Return(result))
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
        }
    }

    fn execute_block(&mut self, stmts: &[Stmt], environment: Rc<Environment>) -> ExecResult {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = (|| {
            for stmt in stmts {
                self.execute(stmt)?;
            }
            Ok(())
        })();
        self.environment = previous;
        result
    }

    // ---- expressions ----

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                if let Some(&distance) = self.locals.get(id) {
                    self.environment.assign_at(distance, &name.lexeme, value.clone());
                } else {
                    self.globals.assign(name, value.clone())?;
                }
                Ok(value)
            }
            Expr::Binary { left, operator, right } => self.eval_binary(left, operator, right),
            Expr::Call { callee, arguments, paren } => {
                let callee = self.evaluate(callee)?;
                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }
                self.call(callee, args, paren)
            }
            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => {
                        if let Some(value) = instance.fields.borrow().get(&name.lexeme) {
                            return Ok(value.clone());
                        }
                        if let Some(method) = instance.class.methods.get(&name.lexeme) {
                            return Ok(Value::Function(bind(method, Rc::clone(&instance))));
                        }
                        Err(RuntimeError::undefined_property(name.clone(), &name.lexeme))
                    }
                    _ => Err(RuntimeError::only_instances_have_properties(name.clone())),
                }
            }
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Index {
                indexee,
                bracket,
                start,
                stop,
            } => self.eval_index(indexee, bracket, start, stop.as_deref()),
            Expr::List { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::list(values))
            }
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Logical { left, operator, right } => {
                let left = self.evaluate(left)?;
                match operator.kind {
                    TokenKind::Or => {
                        if left.is_truthy() {
                            Ok(left)
                        } else {
                            self.evaluate(right)
                        }
                    }
                    _ => {
                        if !left.is_truthy() {
                            Ok(left)
                        } else {
                            self.evaluate(right)
                        }
                    }
                }
            }
            Expr::Replace {
                indexee,
                bracket,
                index,
                value,
            } => self.eval_replace(indexee, bracket, index, value),
            Expr::Set { object, name, value } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => {
                        let value = self.evaluate(value)?;
                        instance.fields.borrow_mut().insert(name.lexeme.clone(), value.clone());
                        Ok(value)
                    }
                    _ => Err(RuntimeError::only_instances_have_fields(name.clone())),
                }
            }
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }
            Expr::This { id, keyword } => self.lookup_variable(*id, keyword),
            Expr::Unary { operator, operand } => self.eval_unary(operator, operand),
            Expr::Variable { id, name } => self.lookup_variable(*id, name),
        }
    }

    fn lookup_variable(&self, id: NodeId, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(&distance) = self.locals.get(&id) {
            Ok(self.environment.get_at(distance, &name.lexeme))
        } else {
            self.globals.get(name)
        }
    }

    fn eval_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        if matches!(operator.kind, TokenKind::EqualEqual | TokenKind::BangEqual) {
            let l = self.evaluate(left)?;
            let r = self.evaluate(right)?;
            return Ok(Value::Bool(if operator.kind == TokenKind::EqualEqual { l == r } else { l != r }));
        }

        let l = self.evaluate(left)?;
        let r = self.evaluate(right)?;
        match operator.kind {
            TokenKind::Plus => match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Sequence(a), Value::Sequence(b)) => {
                    let a = a.borrow();
                    let b = b.borrow();
                    if a.is_string != b.is_string {
                        return Err(RuntimeError::operands_must_be_addable(operator.clone()));
                    }
                    let mut elements = a.elements.clone();
                    elements.extend(b.elements.iter().cloned());
                    Ok(Value::Sequence(Rc::new(RefCell::new(SequenceData {
                        elements,
                        is_string: a.is_string,
                    }))))
                }
                _ => Err(RuntimeError::operands_must_be_addable(operator.clone())),
            },
            TokenKind::Minus => Ok(Value::Number(as_number(&l, operator)? - as_number(&r, operator)?)),
            TokenKind::Star => Ok(Value::Number(as_number(&l, operator)? * as_number(&r, operator)?)),
            TokenKind::Slash => Ok(Value::Number(as_number(&l, operator)? / as_number(&r, operator)?)),
            TokenKind::Greater => Ok(Value::Bool(as_number(&l, operator)? > as_number(&r, operator)?)),
            TokenKind::GreaterEqual => Ok(Value::Bool(as_number(&l, operator)? >= as_number(&r, operator)?)),
            TokenKind::Less => Ok(Value::Bool(as_number(&l, operator)? < as_number(&r, operator)?)),
            TokenKind::LessEqual => Ok(Value::Bool(as_number(&l, operator)? <= as_number(&r, operator)?)),
            _ => unreachable!("parser never produces this operator in Binary position"),
        }
    }

    fn eval_unary(&mut self, operator: &Token, operand: &Expr) -> Result<Value, RuntimeError> {
        let value = self.evaluate(operand)?;
        match operator.kind {
            TokenKind::Bang => Ok(Value::Bool(!value.is_truthy())),
            TokenKind::Minus => Ok(Value::Number(-as_unary_number(&value, operator)?)),
            TokenKind::Plus => Ok(Value::Number(as_unary_number(&value, operator)?)),
            _ => unreachable!("parser never produces this operator in Unary position"),
        }
    }

    /// Negative indices add the sequence length first; an index
    /// expression (no stop) that is still out of range yields an empty
    /// sequence rather than an error, while a slice clamps each
    /// endpoint into `[0, len]`.
    fn eval_index(&mut self, indexee: &Expr, bracket: &Token, start: &Expr, stop: Option<&Expr>) -> Result<Value, RuntimeError> {
        let indexee = self.evaluate(indexee)?;
        let seq = match &indexee {
            Value::Sequence(seq) => Rc::clone(seq),
            _ => return Err(RuntimeError::indexee_must_be_sequence(bracket.clone())),
        };

        match stop {
            None => {
                let start = self.evaluate(start)?;
                let index = as_optional_index(&start, 0, bracket)?;
                let data = seq.borrow();
                let len = data.elements.len() as i64;
                let mut i = index;
                if i < 0 {
                    i += len;
                }
                if i < 0 || i >= len {
                    return Ok(empty_like(&data));
                }
                let element = data.elements[i as usize].clone();
                if data.is_string {
                    let byte = match element {
                        Value::Number(n) => n as u8,
                        _ => 0,
                    };
                    Ok(Value::string(vec![byte]))
                } else {
                    Ok(element)
                }
            }
            Some(stop_expr) => {
                let start_value = self.evaluate(start)?;
                let stop_value = self.evaluate(stop_expr)?;
                let data = seq.borrow();
                let len = data.elements.len() as i64;

                let mut a = as_optional_index(&start_value, 0, bracket)?;
                if a < 0 {
                    a += len;
                }
                a = a.clamp(0, len);

                let mut b = as_optional_index(&stop_value, len, bracket)?;
                if b < 0 {
                    b += len;
                }
                b = b.clamp(0, len);

                if b <= a {
                    return Ok(empty_like(&data));
                }
                let slice: Vec<Value> = data.elements[a as usize..b as usize].to_vec();
                Ok(Value::Sequence(Rc::new(RefCell::new(SequenceData {
                    elements: slice,
                    is_string: data.is_string,
                }))))
            }
        }
    }

    /// Evaluates the indexee, then the new value, then the index
    /// expression, matching the reference implementation's order for
    /// `ReplaceExpr`.
    fn eval_replace(&mut self, indexee: &Expr, bracket: &Token, index: &Expr, value: &Expr) -> Result<Value, RuntimeError> {
        let indexee = self.evaluate(indexee)?;
        let seq = match &indexee {
            Value::Sequence(seq) => Rc::clone(seq),
            _ => return Err(RuntimeError::indexee_must_be_sequence(bracket.clone())),
        };
        let value = self.evaluate(value)?;
        let index = self.evaluate(index)?;
        let index = match index {
            Value::Number(n) => n as i64,
            _ => return Err(RuntimeError::index_must_be_number(bracket.clone())),
        };

        let mut data = seq.borrow_mut();
        let len = data.elements.len() as i64;
        let mut i = index;
        if i < 0 {
            i += len;
        }
        if i < 0 || i >= len {
            return Err(RuntimeError::index_out_of_range(bracket.clone()));
        }

        if data.is_string {
            let byte = match &value {
                Value::Sequence(v) => {
                    let v = v.borrow();
                    if v.is_string && v.elements.len() == 1 {
                        Some(v.elements[0].clone())
                    } else {
                        None
                    }
                }
                _ => None,
            };
            match byte {
                Some(b) => data.elements[i as usize] = b,
                None => return Err(RuntimeError::replace_value_must_be_char(bracket.clone())),
            }
        } else {
            data.elements[i as usize] = value.clone();
        }
        drop(data);
        Ok(value)
    }

    fn call(&mut self, callee: Value, arguments: Vec<Value>, paren: &Token) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(func) => self.call_function(&func, arguments, paren),
            Value::NativeFunction(native) => {
                if arguments.len() != native.arity {
                    return Err(RuntimeError::arity_mismatch(paren.clone(), native.arity, arguments.len()));
                }
                (native.func)(self, &arguments).map_err(|err| RuntimeError::new(paren.clone(), err.message))
            }
            Value::Class(class) => {
                let init = class.methods.get("init").cloned();
                let arity = init.as_ref().map(|f| f.declaration.params.len()).unwrap_or(0);
                if arguments.len() != arity {
                    return Err(RuntimeError::arity_mismatch(paren.clone(), arity, arguments.len()));
                }
                let instance = Rc::new(InstanceData {
                    class: Rc::clone(&class),
                    fields: RefCell::new(HashMap::new()),
                });
                if let Some(init) = init {
                    let bound = bind(&init, Rc::clone(&instance));
                    self.call_function(&bound, arguments, paren)?;
                }
                Ok(Value::Instance(instance))
            }
            _ => Err(RuntimeError::not_callable(paren.clone())),
        }
    }

    /// Pushes a fresh frame over the closure, binds parameters, and
    /// runs the body as a block. An `init` method always yields the
    /// bound instance, whether it returns explicitly or falls off the
    /// end of its body.
    fn call_function(&mut self, func: &Rc<FunctionData>, arguments: Vec<Value>, paren: &Token) -> Result<Value, RuntimeError> {
        if arguments.len() != func.declaration.params.len() {
            return Err(RuntimeError::arity_mismatch(paren.clone(), func.declaration.params.len(), arguments.len()));
        }
        let call_env = Environment::with_enclosing(Rc::clone(&func.closure));
        for (param, arg) in func.declaration.params.iter().zip(arguments) {
            call_env.define(param.lexeme.clone(), arg);
        }
        match self.execute_block(&func.declaration.body, call_env) {
            Ok(()) => {
                if func.is_initializer {
                    Ok(func.closure.get_at(0, "this"))
                } else {
                    Ok(Value::Nil)
                }
            }
            Err(Signal::Return(value)) => {
                if func.is_initializer {
                    Ok(func.closure.get_at(0, "this"))
                } else {
                    Ok(value)
                }
            }
            Err(Signal::Error(err)) => Err(err),
        }
    }
}

/// Produces a new callable whose enclosing scope supplies `this`: a
/// fresh frame over the method's original closure with a single
/// binding.
fn bind(func: &Rc<FunctionData>, instance: Rc<InstanceData>) -> Rc<FunctionData> {
    let closure = Environment::with_enclosing(Rc::clone(&func.closure));
    closure.define("this", Value::Instance(instance));
    Rc::new(FunctionData {
        declaration: Rc::clone(&func.declaration),
        closure,
        is_initializer: func.is_initializer,
    })
}

fn as_number(value: &Value, operator: &Token) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(RuntimeError::operands_must_be_numbers(operator.clone())),
    }
}

fn as_unary_number(value: &Value, operator: &Token) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(RuntimeError::operand_must_be_number(operator.clone())),
    }
}

/// An index or slice endpoint is optional: `nil` stands for the given
/// default (0 for a bare index or a slice start, the sequence length
/// for a slice stop). Anything else that isn't a number is an error:
/// "Indices must be numbers." (plural), distinct from `Replace`'s
/// singular wording, matching the reference's `visitIndexExpr`.
fn as_optional_index(value: &Value, default: i64, bracket: &Token) -> Result<i64, RuntimeError> {
    match value {
        Value::Nil => Ok(default),
        Value::Number(n) => Ok(*n as i64),
        _ => Err(RuntimeError::indices_must_be_numbers(bracket.clone())),
    }
}

fn empty_like(data: &SequenceData) -> Value {
    if data.is_string {
        Value::string(vec![])
    } else {
        Value::list(vec![])
    }
}

fn define_globals(env: &Rc<Environment>) {
    env.define(
        "clock",
        Value::NativeFunction(Rc::new(NativeFunctionData {
            name: "clock".to_string(),
            arity: 0,
            func: native_clock,
        })),
    );
    env.define(
        "len",
        Value::NativeFunction(Rc::new(NativeFunctionData {
            name: "len".to_string(),
            arity: 1,
            func: native_len,
        })),
    );
    env.define(
        "print",
        Value::NativeFunction(Rc::new(NativeFunctionData {
            name: "print".to_string(),
            arity: 1,
            func: native_print,
        })),
    );
    env.define(
        "toNumber",
        Value::NativeFunction(Rc::new(NativeFunctionData {
            name: "toNumber".to_string(),
            arity: 1,
            func: native_to_number,
        })),
    );
    env.define(
        "toString",
        Value::NativeFunction(Rc::new(NativeFunctionData {
            name: "toString".to_string(),
            arity: 1,
            func: native_to_string,
        })),
    );
}

fn native_clock(_interp: &mut Interpreter, _args: &[Value]) -> Result<Value, RuntimeError> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| RuntimeError::native("System clock is before the Unix epoch."))?
        .as_secs_f64();
    Ok(Value::Number(secs))
}

fn native_len(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Sequence(seq) => Ok(Value::Number(seq.borrow().elements.len() as f64)),
        _ => Err(RuntimeError::native("Expect string or list.")),
    }
}

fn native_print(interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    interp.output.write(&stringify(&args[0], false));
    interp.output.write("\n");
    Ok(Value::Nil)
}

fn native_to_number(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Sequence(seq) if seq.borrow().is_string => {
            let text = stringify(&args[0], false);
            parse_number_strict(&text)
                .map(Value::Number)
                .ok_or_else(|| RuntimeError::native("Invalid format."))
        }
        _ => Err(RuntimeError::native("Expect string.")),
    }
}

fn native_to_string(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::string_from(&stringify(&args[0], false)))
}

/// A hand-rolled scan for `[+-]?digit+(\.digit+)?`, matched in full.
/// Deliberately stricter than `f64::from_str`: forms the host parser
/// would accept (leading `.5`, trailing `5.`, exponents, `inf`/`nan`)
/// are rejected, matching the reference lexer's number grammar, which
/// always requires a digit before any `.`.
fn parse_number_strict(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start {
        return None;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return None;
        }
    }
    if i != bytes.len() {
        return None;
    }
    text.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer, parser, resolver};

    fn run(source: &str) -> (String, Result<(), RuntimeError>) {
        let (tokens, lex_diags) = lexer::scan(source);
        assert!(lex_diags.is_empty(), "{lex_diags:?}");
        let (stmts, parse_diags) = parser::parse(tokens);
        assert!(parse_diags.is_empty(), "{parse_diags:?}");
        let (locals, resolve_diags) = resolver::resolve(&stmts);
        assert!(resolve_diags.is_empty(), "{resolve_diags:?}");
        let (mut interp, buf) = Interpreter::with_capture(locals);
        let result = interp.interpret(&stmts);
        let output = String::from_utf8(buf.borrow().clone()).unwrap();
        (output, result)
    }

    #[test]
    fn closures_capture_by_reference() {
        let (out, result) = run("var f; { var x = 1; fun g() { return x; } x = 2; f = g; } print(f());");
        result.unwrap();
        assert_eq!(out, "2\n");
    }

    #[test]
    fn class_initializer_and_method() {
        let (out, result) = run("class P { init(x) { this.x = x; } get() { return this.x; } } print(P(7).get());");
        result.unwrap();
        assert_eq!(out, "7\n");
    }

    #[test]
    fn list_mutation_aliases() {
        let (out, result) = run("var a = [1,2,3]; var b = a; b[0] = 9; print(a);");
        result.unwrap();
        assert_eq!(out, "[9, 2, 3]\n");
    }

    #[test]
    fn string_slice_and_concatenation() {
        let (out, result) = run(r#"print("hello"[1:4] + "p!");"#);
        result.unwrap();
        assert_eq!(out, "ellp!\n");
    }

    #[test]
    fn short_circuit_returns_operand_not_bool() {
        let (out, result) = run(r#"print(nil or "x"); print(0 and "y");"#);
        result.unwrap();
        assert_eq!(out, "x\ny\n");
    }

    #[test]
    fn for_desugar_accumulates_like_explicit_while() {
        let (out, result) = run("fun s(n) { var t = 0; for (var i = 0; i < n; i = i + 1) t = t + i; return t; } print(s(5));");
        result.unwrap();
        assert_eq!(out, "10\n");
    }

    #[test]
    fn init_returns_instance_even_with_bare_return() {
        let (out, result) = run("class C { init() { return; } } print(toString(C()));");
        result.unwrap();
        assert_eq!(out, "C instance\n");
    }

    #[test]
    fn negative_index_out_of_range_is_empty_not_error() {
        let (out, result) = run(r#"print([1,2,3][-10]);"#);
        result.unwrap();
        assert_eq!(out, "[]\n");
    }

    #[test]
    fn replace_out_of_range_is_an_error() {
        let (_, result) = run("var a = [1]; a[5] = 2;");
        let err = result.unwrap_err();
        assert_eq!(err.message, "Index out of range.");
    }

    #[test]
    fn replace_string_requires_length_one_string() {
        let (_, result) = run(r#"var s = "ab"; s[0] = "xy";"#);
        let err = result.unwrap_err();
        assert_eq!(err.message, "Replace value must be string of length 1.");
    }

    #[test]
    fn division_by_zero_is_ieee_passthrough() {
        let (out, result) = run("print(1 / 0); print(-1 / 0); print(0 / 0);");
        result.unwrap();
        assert_eq!(out, "inf\n-inf\nNaN\n");
    }

    #[test]
    fn addition_requires_matching_sequence_kind() {
        let (_, result) = run(r#"print("a" + [1]);"#);
        let err = result.unwrap_err();
        assert_eq!(err.message, "Operands must be two numbers, two strings, or two lists.");
    }

    #[test]
    fn undefined_property_and_field_errors() {
        let (_, result) = run("class C {} print(C().missing);");
        assert_eq!(result.unwrap_err().message, "Undefined property 'missing'.");
    }

    #[test]
    fn calling_non_callable_is_an_error() {
        let (_, result) = run("var x = 1; x();");
        assert_eq!(result.unwrap_err().message, "Can only call functions and classes.");
    }

    #[test]
    fn arity_mismatch_reports_both_counts() {
        let (_, result) = run("fun f(a, b) { return a; } f(1);");
        assert_eq!(result.unwrap_err().message, "Expected 2 arguments but got 1.");
    }

    #[test]
    fn to_number_rejects_leading_or_trailing_dot() {
        let (out, result) = run(r#"print(toNumber("5") + 1);"#);
        result.unwrap();
        assert_eq!(out, "6\n");
        let (_, result2) = run(r#"toNumber(".5");"#);
        assert_eq!(result2.unwrap_err().message, "Invalid format.");
        let (_, result3) = run(r#"toNumber("5.");"#);
        assert_eq!(result3.unwrap_err().message, "Invalid format.");
    }

    #[test]
    fn native_function_error_is_decorated_with_call_site_paren() {
        let (_, result) = run("len(1);");
        let err = result.unwrap_err();
        assert_eq!(err.message, "Expect string or list.");
    }

    #[test]
    fn ternary_only_evaluates_the_selected_branch() {
        let (out, result) = run(r#"print(true ? "a" : "b"); print(false ? "a" : "b");"#);
        result.unwrap();
        assert_eq!(out, "a\nb\n");
    }

    #[test]
    fn compound_assignment_and_postfix_increment() {
        let (out, result) = run("var x = 1; x += 2; x++; print(x);");
        result.unwrap();
        assert_eq!(out, "4\n");
    }
}
