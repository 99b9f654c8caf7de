//! Exchange structure parser.
//!
//! Turns the token stream into an untyped instance table: every `#id` maps
//! to its type name and raw parameters, nothing is resolved or checked
//! against a schema. Complex instances such as
//! `#5=(LENGTH_UNIT()NAMED_UNIT(*));` keep their partial records as
//! [`StepValue::Typed`] parameters under the [`COMPLEX_TYPE`] name.

use std::collections::HashMap;

use crate::error::StepError;
use crate::lexer::{Lexer, SpannedToken, Token};

/// Type name given to complex (multi-part) instances.
pub const COMPLEX_TYPE: &str = "";

/// One parameter of an instance or header record.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    /// `#id`
    EntityRef(u64),
    /// `'text'`
    String(String),
    /// Real literal.
    Real(f64),
    /// Integer literal.
    Integer(i64),
    /// `.NAME.`, stored without dots.
    Enum(String),
    /// Parenthesized aggregate.
    List(Vec<StepValue>),
    /// `*`
    Derived,
    /// `$`
    Null,
    /// Typed parameter such as `LENGTH_MEASURE(1.E-7)`, or a partial
    /// record of a complex instance.
    Typed {
        /// Keyword before the parentheses.
        type_name: String,
        /// Parameters inside them.
        args: Vec<StepValue>,
    },
}

impl StepValue {
    /// The referenced instance id.
    pub fn as_entity_ref(&self) -> Option<u64> {
        if let StepValue::EntityRef(id) = self {
            Some(*id)
        } else {
            None
        }
    }

    /// Numeric value; integers widen to `f64`.
    pub fn as_real(&self) -> Option<f64> {
        match *self {
            StepValue::Real(v) => Some(v),
            StepValue::Integer(i) => Some(i as f64),
            _ => None,
        }
    }

    /// String contents.
    pub fn as_string(&self) -> Option<&str> {
        if let StepValue::String(text) = self {
            Some(text)
        } else {
            None
        }
    }

    /// Enumeration name without dots.
    pub fn as_enum(&self) -> Option<&str> {
        if let StepValue::Enum(name) = self {
            Some(name)
        } else {
            None
        }
    }

    /// Aggregate members.
    pub fn as_list(&self) -> Option<&[StepValue]> {
        if let StepValue::List(items) = self {
            Some(items)
        } else {
            None
        }
    }
}

/// An instance from the data section, or a header record.
#[derive(Debug, Clone)]
pub struct StepEntity {
    /// Instance id; zero for header records.
    pub id: u64,
    /// Upper-cased type name, [`COMPLEX_TYPE`] for complex instances.
    pub type_name: String,
    /// Parameters, or the partial records of a complex instance.
    pub args: Vec<StepValue>,
}

impl StepEntity {
    /// Whether this is a complex instance made of several typed parts.
    pub fn is_complex(&self) -> bool {
        self.type_name == COMPLEX_TYPE
    }

    /// Arguments of the named part of a complex instance.
    pub fn part(&self, name: &str) -> Option<&[StepValue]> {
        self.args.iter().find_map(|v| match v {
            StepValue::Typed { type_name, args } if type_name == name => Some(args.as_slice()),
            _ => None,
        })
    }
}

/// Header records and the instance table of one file.
#[derive(Debug, Clone)]
pub struct StepFile {
    /// Header records in file order.
    pub header: Vec<StepEntity>,
    /// Data section instances by id.
    pub entities: HashMap<u64, StepEntity>,
}

impl StepFile {
    /// Look up an instance.
    pub fn get(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Look up an instance that must exist.
    pub fn require(&self, id: u64) -> Result<&StepEntity, StepError> {
        self.get(id).ok_or(StepError::MissingEntity(id))
    }

    /// All instances of one type in ascending id order.
    pub fn entities_of_type(&self, type_name: &str) -> Vec<&StepEntity> {
        let mut found: Vec<&StepEntity> = self
            .entities
            .values()
            .filter(|e| e.type_name == type_name)
            .collect();
        found.sort_unstable_by_key(|e| e.id);
        found
    }

    /// Schema names from the `FILE_SCHEMA` header entry.
    pub fn schema(&self) -> Vec<&str> {
        self.header
            .iter()
            .filter(|e| e.type_name == "FILE_SCHEMA")
            .flat_map(|e| e.args.first().and_then(|a| a.as_list()).unwrap_or_default())
            .filter_map(|v| v.as_string())
            .collect()
    }
}

/// Recursive-descent reader of the exchange structure.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    cursor: usize,
}

impl Parser {
    /// Parse a complete exchange file.
    pub fn parse(input: &[u8]) -> Result<StepFile, StepError> {
        let tokens = Lexer::new(input).tokenize()?;
        Parser { tokens, cursor: 0 }.exchange_file()
    }

    fn exchange_file(mut self) -> Result<StepFile, StepError> {
        let mut file = StepFile {
            header: Vec::new(),
            entities: HashMap::new(),
        };
        self.keyword("ISO-10303-21")?;
        self.punct(Token::Semicolon)?;

        loop {
            let section = match self.current() {
                Some(Token::Keyword(k)) => k.clone(),
                Some(_) => return Err(self.unexpected(None, "section keyword")),
                None => break,
            };
            self.cursor += 1;
            self.punct(Token::Semicolon)?;
            match section.as_str() {
                "END-ISO-10303-21" => break,
                "HEADER" => file.header = self.header_entries()?,
                "DATA" => {
                    while let Some(entity) = self.instance()? {
                        let id = entity.id;
                        if file.entities.insert(id, entity).is_some() {
                            return Err(StepError::parser(Some(id), "duplicate entity id"));
                        }
                    }
                }
                other => {
                    return Err(StepError::parser(None, format!("unknown section {other}")));
                }
            }
            self.keyword("ENDSEC")?;
            self.punct(Token::Semicolon)?;
        }
        Ok(file)
    }

    /// Header entries are records without instance names.
    fn header_entries(&mut self) -> Result<Vec<StepEntity>, StepError> {
        let mut entries = Vec::new();
        while let Some(Token::Keyword(name)) = self.current() {
            if name == "ENDSEC" {
                break;
            }
            let type_name = name.clone();
            self.cursor += 1;
            let args = self.parameter_list()?;
            self.punct(Token::Semicolon)?;
            entries.push(StepEntity {
                id: 0,
                type_name,
                args,
            });
        }
        Ok(entries)
    }

    /// `#id = TYPE(...);` or `#id = (A(...) B(...));`, `None` at `ENDSEC`.
    fn instance(&mut self) -> Result<Option<StepEntity>, StepError> {
        let id = match self.current() {
            Some(Token::EntityRef(id)) => *id,
            Some(Token::Keyword(k)) if k == "ENDSEC" => return Ok(None),
            _ => return Err(self.unexpected(None, "entity instance")),
        };
        self.cursor += 1;
        self.punct(Token::Equals)?;

        let entity = match self.current() {
            Some(Token::Keyword(name)) => {
                let type_name = name.clone();
                self.cursor += 1;
                StepEntity {
                    id,
                    type_name,
                    args: self.parameter_list()?,
                }
            }
            Some(Token::LParen) => {
                self.cursor += 1;
                let mut parts = Vec::new();
                while let Some(Token::Keyword(name)) = self.current() {
                    let type_name = name.clone();
                    self.cursor += 1;
                    let args = self.parameter_list()?;
                    parts.push(StepValue::Typed { type_name, args });
                }
                self.punct(Token::RParen)?;
                StepEntity {
                    id,
                    type_name: COMPLEX_TYPE.to_string(),
                    args: parts,
                }
            }
            _ => return Err(self.unexpected(Some(id), "type name")),
        };
        self.punct(Token::Semicolon)?;
        Ok(Some(entity))
    }

    fn parameter_list(&mut self) -> Result<Vec<StepValue>, StepError> {
        self.punct(Token::LParen)?;
        let mut params = Vec::new();
        if self.current() == Some(&Token::RParen) {
            self.cursor += 1;
            return Ok(params);
        }
        loop {
            params.push(self.parameter()?);
            match self.current() {
                Some(Token::Comma) => self.cursor += 1,
                Some(Token::RParen) => {
                    self.cursor += 1;
                    return Ok(params);
                }
                _ => return Err(self.unexpected(None, "',' or ')'")),
            }
        }
    }

    fn parameter(&mut self) -> Result<StepValue, StepError> {
        let Some(token) = self.current().cloned() else {
            return Err(self.unexpected(None, "value"));
        };
        let value = match token {
            Token::LParen => return self.parameter_list().map(StepValue::List),
            Token::Keyword(type_name) => {
                self.cursor += 1;
                let args = self.parameter_list()?;
                return Ok(StepValue::Typed { type_name, args });
            }
            Token::EntityRef(id) => StepValue::EntityRef(id),
            Token::String(s) => StepValue::String(s),
            Token::Real(v) => StepValue::Real(v),
            Token::Integer(v) => StepValue::Integer(v),
            Token::Enum(s) => StepValue::Enum(s),
            Token::Asterisk => StepValue::Derived,
            Token::Dollar => StepValue::Null,
            _ => return Err(self.unexpected(None, "value")),
        };
        self.cursor += 1;
        Ok(value)
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|t| &t.token)
    }

    fn punct(&mut self, expected: Token) -> Result<(), StepError> {
        if self.current() == Some(&expected) {
            self.cursor += 1;
            Ok(())
        } else {
            Err(self.unexpected(None, &format!("{expected:?}")))
        }
    }

    fn keyword(&mut self, name: &str) -> Result<(), StepError> {
        match self.current() {
            Some(Token::Keyword(k)) if k == name => {
                self.cursor += 1;
                Ok(())
            }
            _ => Err(self.unexpected(None, &format!("keyword '{name}'"))),
        }
    }

    fn unexpected(&self, entity_id: Option<u64>, wanted: &str) -> StepError {
        let message = match self.tokens.get(self.cursor) {
            Some(t) => format!(
                "expected {wanted}, got {:?} at line {}, column {}",
                t.token, t.pos.line, t.pos.col
            ),
            None => format!("expected {wanted}, got end of input"),
        };
        StepError::parser(entity_id, message)
    }
}
