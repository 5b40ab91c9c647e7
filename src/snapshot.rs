//! Offline introspection host backed by a JSON memory snapshot.
//!
//! A snapshot captures what a debugger would expose about a stopped process:
//! type declarations, raw memory cells keyed by address, named symbols and the
//! call stack. Values are interpreted lazily against their static type, so a
//! union cell may carry only the arm that is live and a `null` anywhere stands
//! for memory the debugger could not read.
//!
//! ```json
//! {
//!   "types":   { "PT_NODE": { "kind": "struct", "fields": [{ "name": "next", "type": "PT_NODE *" }] } },
//!   "memory":  { "0x1000": { "next": "0x0" } },
//!   "symbols": { "node": { "type": "PT_NODE *", "value": "0x1000" } },
//!   "backtrace": [{ "function": "main", "file": "src/main.c", "line": 12 }]
//! }
//! ```

use crate::error::{PtvizError, PtvizResult};
use crate::host::{FieldDesc, InspectedValue, IntrospectionHost, StackFrame, TypeInfo, TypeKind};
use crate::type_classifier::{normalize_type_name, parse_address};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

/// On-disk snapshot document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub types: BTreeMap<String, TypeDecl>,
    #[serde(default)]
    pub memory: BTreeMap<String, Value>,
    #[serde(default)]
    pub symbols: BTreeMap<String, Symbol>,
    #[serde(default)]
    pub backtrace: Vec<StackFrame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeDecl {
    pub kind: TypeKind,
    #[serde(default)]
    pub fields: Vec<FieldDesc>,
    /// Pointee type for pointer typedefs, element type for arrays.
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Symbol {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug)]
struct SnapshotData {
    types: HashMap<String, TypeDecl>,
    cells: HashMap<u64, Value>,
    symbols: BTreeMap<String, Symbol>,
    backtrace: Vec<StackFrame>,
}

#[derive(Debug, Clone)]
struct ResolvedType {
    kind: TypeKind,
    fields: Vec<FieldDesc>,
    target: Option<String>,
}

impl SnapshotData {
    fn resolve(&self, name: &str) -> ResolvedType {
        let normalized = normalize_type_name(name);
        if let Some(decl) = self.types.get(name).or_else(|| self.types.get(&normalized)) {
            return ResolvedType {
                kind: decl.kind,
                fields: decl.fields.clone(),
                target: decl.target.clone(),
            };
        }

        if let Some(base) = normalized.strip_suffix('*') {
            return ResolvedType {
                kind: TypeKind::Pointer,
                fields: Vec::new(),
                target: Some(base.trim_end().to_string()),
            };
        }

        if normalized.ends_with(']') {
            let element = normalized
                .split_once('[')
                .map(|(elem, _)| elem.trim_end().to_string());
            return ResolvedType {
                kind: TypeKind::Array,
                fields: Vec::new(),
                target: element,
            };
        }

        ResolvedType {
            kind: builtin_kind(&normalized),
            fields: Vec::new(),
            target: None,
        }
    }

    fn is_known(&self, name: &str) -> bool {
        let normalized = normalize_type_name(name);
        self.types.contains_key(name)
            || self.types.contains_key(&normalized)
            || self.resolve(name).kind != TypeKind::Other
    }
}

fn builtin_kind(name: &str) -> TypeKind {
    match name {
        "char" | "signed char" | "unsigned char" => TypeKind::Char,
        "float" | "double" | "long double" => TypeKind::Float,
        "bool" | "_Bool" => TypeKind::Bool,
        "void" => TypeKind::Void,
        "_Decimal32" | "_Decimal64" | "_Decimal128" => TypeKind::Decfloat,
        "size_t" | "ssize_t" | "int8_t" | "int16_t" | "int32_t" | "int64_t" | "uint8_t"
        | "uint16_t" | "uint32_t" | "uint64_t" | "intptr_t" | "uintptr_t" => TypeKind::Int,
        _ if !name.is_empty()
            && name
                .split_whitespace()
                .all(|w| matches!(w, "unsigned" | "signed" | "int" | "short" | "long")) =>
        {
            TypeKind::Int
        }
        _ => TypeKind::Other,
    }
}

/// Host over a loaded [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotHost {
    data: Rc<SnapshotData>,
}

impl SnapshotHost {
    pub fn new(snapshot: Snapshot) -> PtvizResult<Self> {
        let mut cells = HashMap::with_capacity(snapshot.memory.len());
        for (addr, raw) in snapshot.memory {
            let Some(parsed) = parse_address(&addr) else {
                return Err(PtvizError::snapshot(format!(
                    "memory key `{addr}` is not a hex address"
                )));
            };
            cells.insert(parsed, raw);
        }

        Ok(Self {
            data: Rc::new(SnapshotData {
                types: snapshot.types.into_iter().collect(),
                cells,
                symbols: snapshot.symbols,
                backtrace: snapshot.backtrace,
            }),
        })
    }

    pub fn from_json(doc: Value) -> PtvizResult<Self> {
        let snapshot: Snapshot = serde_json::from_value(doc)?;
        Self::new(snapshot)
    }

    pub fn load(path: &Path) -> PtvizResult<Self> {
        std::fs::read_to_string(path)?.parse()
    }

    fn symbol(&self, name: &str) -> Option<SnapValue> {
        self.data.symbols.get(name).map(|sym| SnapValue {
            data: Rc::clone(&self.data),
            type_name: sym.type_name.clone(),
            raw: sym.value.clone(),
        })
    }
}

impl FromStr for SnapshotHost {
    type Err = PtvizError;

    fn from_str(raw: &str) -> PtvizResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;
        Self::new(snapshot)
    }
}

impl IntrospectionHost for SnapshotHost {
    type Value = SnapValue;

    fn lookup_type(&self, name: &str) -> Option<TypeInfo> {
        if !self.data.is_known(name) {
            return None;
        }
        Some(TypeInfo::new(name, self.data.resolve(name).kind))
    }

    fn evaluate(&self, expr: &str) -> PtvizResult<SnapValue> {
        let tokens = tokenize(expr).map_err(|reason| PtvizError::evaluation(expr, reason))?;
        let mut parser = ExprParser {
            host: self,
            tokens: &tokens,
            pos: 0,
        };
        let value = parser
            .unary()
            .map_err(|err| PtvizError::evaluation(expr, err.to_string()))?;
        if parser.pos != tokens.len() {
            return Err(PtvizError::evaluation(expr, "trailing input"));
        }
        Ok(value)
    }

    fn backtrace(&self) -> PtvizResult<Vec<StackFrame>> {
        Ok(self.data.backtrace.clone())
    }
}

/// Value handle into a snapshot.
#[derive(Debug, Clone)]
pub struct SnapValue {
    data: Rc<SnapshotData>,
    type_name: String,
    raw: Value,
}

impl SnapValue {
    fn resolved(&self) -> ResolvedType {
        self.data.resolve(&self.type_name)
    }

    fn address(&self) -> Option<u64> {
        match &self.raw {
            Value::String(s) => parse_address(s),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    fn render_aggregate(&self, fields: &[FieldDesc]) -> PtvizResult<String> {
        let Value::Object(members) = &self.raw else {
            return Err(PtvizError::not_accessible(format!(
                "`{}` value is not readable",
                self.type_name
            )));
        };
        let parts: Vec<String> = fields
            .iter()
            .filter_map(|f| {
                let raw = members.get(&f.name)?;
                let member = SnapValue {
                    data: Rc::clone(&self.data),
                    type_name: f.type_name.clone(),
                    raw: raw.clone(),
                };
                let rendered = member
                    .render()
                    .unwrap_or_else(|_| "<unreadable>".to_string());
                Some(format!("{} = {}", f.name, rendered))
            })
            .collect();
        Ok(format!("{{{}}}", parts.join(", ")))
    }
}

impl InspectedValue for SnapValue {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::new(self.type_name.clone(), self.resolved().kind)
    }

    fn fields(&self) -> Vec<FieldDesc> {
        let resolved = self.resolved();
        match resolved.kind {
            TypeKind::Struct | TypeKind::Union => resolved.fields,
            _ => Vec::new(),
        }
    }

    fn field(&self, name: &str) -> PtvizResult<SnapValue> {
        let resolved = self.resolved();
        if !matches!(resolved.kind, TypeKind::Struct | TypeKind::Union) {
            return Err(PtvizError::not_accessible(format!(
                "`{}` has no members",
                self.type_name
            )));
        }
        let Some(decl) = resolved.fields.iter().find(|f| f.name == name) else {
            return Err(PtvizError::not_accessible(format!(
                "`{}` has no member named `{name}`",
                self.type_name
            )));
        };
        let raw = match &self.raw {
            Value::Object(members) => members.get(name),
            _ => None,
        };
        let Some(raw) = raw else {
            return Err(PtvizError::not_accessible(format!(
                "{}.{name} is not readable",
                self.type_name
            )));
        };
        Ok(SnapValue {
            data: Rc::clone(&self.data),
            type_name: decl.type_name.clone(),
            raw: raw.clone(),
        })
    }

    fn dereference(&self) -> PtvizResult<SnapValue> {
        let resolved = self.resolved();
        if resolved.kind != TypeKind::Pointer {
            return Err(PtvizError::deref(format!(
                "`{}` is not a pointer",
                self.type_name
            )));
        }
        let Some(addr) = self.address() else {
            return Err(PtvizError::deref(format!(
                "`{}` holds no address",
                self.type_name
            )));
        };
        let Some(cell) = self.data.cells.get(&addr) else {
            return Err(PtvizError::deref(format!(
                "cannot access memory at address {addr:#x}"
            )));
        };
        let target = resolved.target.unwrap_or_else(|| "void".to_string());
        if target == "void" {
            return Err(PtvizError::deref(format!(
                "attempt to take contents of a non-pointer value at {addr:#x}"
            )));
        }
        Ok(SnapValue {
            data: Rc::clone(&self.data),
            type_name: target,
            raw: cell.clone(),
        })
    }

    fn render(&self) -> PtvizResult<String> {
        if self.raw.is_null() {
            return Err(PtvizError::not_accessible(format!(
                "`{}` value is optimized out or unmapped",
                self.type_name
            )));
        }
        let resolved = self.resolved();
        match resolved.kind {
            TypeKind::Pointer => self.address().map(|a| format!("{a:#x}")).ok_or_else(|| {
                PtvizError::not_accessible(format!("`{}` holds no address", self.type_name))
            }),
            TypeKind::Struct | TypeKind::Union => self.render_aggregate(&resolved.fields),
            TypeKind::Array => match &self.raw {
                Value::String(s) => Ok(format!("\"{s}\"")),
                Value::Array(items) => {
                    let element = resolved.target.unwrap_or_else(|| "int".to_string());
                    let parts: Vec<String> = items
                        .iter()
                        .map(|raw| {
                            SnapValue {
                                data: Rc::clone(&self.data),
                                type_name: element.clone(),
                                raw: raw.clone(),
                            }
                            .render()
                            .unwrap_or_else(|_| "<unreadable>".to_string())
                        })
                        .collect();
                    Ok(format!("{{{}}}", parts.join(", ")))
                }
                other => Ok(other.to_string()),
            },
            _ => Ok(match &self.raw {
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                other => other.to_string(),
            }),
        }
    }

    fn read_string(&self) -> PtvizResult<String> {
        match self.resolved().kind {
            TypeKind::Pointer => {
                let target = self.dereference()?;
                match target.raw {
                    Value::String(s) => Ok(s),
                    _ => Err(PtvizError::not_accessible(format!(
                        "`{}` does not point at a character buffer",
                        self.type_name
                    ))),
                }
            }
            TypeKind::Array => match &self.raw {
                Value::String(s) => Ok(s.clone()),
                _ => Err(PtvizError::not_accessible(format!(
                    "`{}` is not a character array",
                    self.type_name
                ))),
            },
            _ => Err(PtvizError::not_accessible(format!(
                "`{}` is not a string",
                self.type_name
            ))),
        }
    }
}

// ============================================================================
// Expression Evaluation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Star,
    Dot,
    Arrow,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '*' => tokens.push(Token::Star),
            '.' => tokens.push(Token::Dot),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '-' => match chars.next() {
                Some((_, '>')) => tokens.push(Token::Arrow),
                _ => return Err(format!("unexpected `-` at offset {idx}")),
            },
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected `{other}` at offset {idx}")),
        }
    }
    if tokens.is_empty() {
        return Err("empty expression".to_string());
    }
    Ok(tokens)
}

struct ExprParser<'a> {
    host: &'a SnapshotHost,
    tokens: &'a [Token],
    pos: usize,
}

impl ExprParser<'_> {
    fn next(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn unary(&mut self) -> PtvizResult<SnapValue> {
        if self.tokens.get(self.pos) == Some(&Token::Star) {
            self.pos += 1;
            return self.unary()?.dereference();
        }
        self.postfix()
    }

    fn postfix(&mut self) -> PtvizResult<SnapValue> {
        let mut value = self.primary()?;
        loop {
            match self.tokens.get(self.pos) {
                Some(Token::Dot) => {
                    self.pos += 1;
                    let member = self.ident()?;
                    value = value.field(&member)?;
                }
                Some(Token::Arrow) => {
                    self.pos += 1;
                    let member = self.ident()?;
                    value = value.dereference()?.field(&member)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn primary(&mut self) -> PtvizResult<SnapValue> {
        match self.next().cloned() {
            Some(Token::Ident(name)) => self
                .host
                .symbol(&name)
                .ok_or_else(|| PtvizError::other(format!("no symbol \"{name}\" in current context"))),
            Some(Token::LParen) => {
                let value = self.unary()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(PtvizError::other("expected `)`")),
                }
            }
            Some(tok) => Err(PtvizError::other(format!("unexpected token {tok:?}"))),
            None => Err(PtvizError::other("unexpected end of expression")),
        }
    }

    fn ident(&mut self) -> PtvizResult<String> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name.clone()),
            _ => Err(PtvizError::other("expected a member name")),
        }
    }
}
