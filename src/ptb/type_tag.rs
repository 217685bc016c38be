//! Move type tags
//!
//! Parses the type strings carried by `CoinConfig`
//! (`0x2::coin::Coin<0x2::sui::SUI>`, `vector<u8>`, ...) into the
//! BCS layout the node expects.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::ObjectId;
use crate::error::SdkError;

/// Variant order is the on-chain enum order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructTag {
    pub address: ObjectId,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::U8 => write!(f, "u8"),
            TypeTag::U16 => write!(f, "u16"),
            TypeTag::U32 => write!(f, "u32"),
            TypeTag::U64 => write!(f, "u64"),
            TypeTag::U128 => write!(f, "u128"),
            TypeTag::U256 => write!(f, "u256"),
            TypeTag::Address => write!(f, "address"),
            TypeTag::Signer => write!(f, "signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{}>", inner),
            TypeTag::Struct(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)?;
        if !self.type_params.is_empty() {
            let params: Vec<String> = self.type_params.iter().map(|t| t.to_string()).collect();
            write!(f, "<{}>", params.join(", "))?;
        }
        Ok(())
    }
}

impl FromStr for TypeTag {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s);
        let tag = parser.parse_type()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(parser.error("trailing characters"));
        }
        Ok(tag)
    }
}

/// Split `pkg::module::function` into its parts
pub fn parse_target(target: &str) -> Result<(ObjectId, String, String), SdkError> {
    let parts: Vec<&str> = target.split("::").collect();
    if parts.len() != 3 || parts.iter().any(|p| p.trim().is_empty()) {
        return Err(SdkError::decode(format!("invalid move call target '{}'", target)));
    }
    let package = ObjectId::from_str(parts[0])?;
    Ok((package, parts[1].trim().to_string(), parts[2].trim().to_string()))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn error(&self, what: &str) -> SdkError {
        SdkError::decode(format!("invalid type '{}': {} at {}", self.src, what, self.pos))
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), SdkError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", token)))
        }
    }

    fn ident(&mut self) -> Result<&'a str, SdkError> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected identifier"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn parse_type(&mut self) -> Result<TypeTag, SdkError> {
        let head = self.ident()?;

        // a primitive keyword is never followed by `::`
        let is_path = self.rest().trim_start().starts_with("::");
        if !is_path {
            return match head {
                "bool" => Ok(TypeTag::Bool),
                "u8" => Ok(TypeTag::U8),
                "u16" => Ok(TypeTag::U16),
                "u32" => Ok(TypeTag::U32),
                "u64" => Ok(TypeTag::U64),
                "u128" => Ok(TypeTag::U128),
                "u256" => Ok(TypeTag::U256),
                "address" => Ok(TypeTag::Address),
                "signer" => Ok(TypeTag::Signer),
                "vector" => {
                    self.expect("<")?;
                    let inner = self.parse_type()?;
                    self.expect(">")?;
                    Ok(TypeTag::Vector(Box::new(inner)))
                }
                _ => Err(self.error(&format!("unknown type '{}'", head))),
            };
        }

        let address = ObjectId::from_str(head)?;
        self.expect("::")?;
        let module = self.ident()?.to_string();
        self.expect("::")?;
        let name = self.ident()?.to_string();

        let mut type_params = Vec::new();
        if self.eat("<") {
            loop {
                type_params.push(self.parse_type()?);
                if self.eat(",") {
                    continue;
                }
                self.expect(">")?;
                break;
            }
        }

        Ok(TypeTag::Struct(Box::new(StructTag {
            address,
            module,
            name,
            type_params,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coin_type() {
        let tag = TypeTag::from_str("0x2::sui::SUI").unwrap();
        match tag {
            TypeTag::Struct(s) => {
                assert_eq!(s.address, ObjectId::from_u8(2));
                assert_eq!(s.module, "sui");
                assert_eq!(s.name, "SUI");
                assert!(s.type_params.is_empty());
            }
            other => panic!("unexpected tag {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_generics() {
        let tag = TypeTag::from_str("0x2::coin::Coin< 0x2::balance::Balance<0x2::sui::SUI> >").unwrap();
        let rendered = tag.to_string();
        assert!(rendered.starts_with("0x0000000000000000000000000000000000000000000000000000000000000002::coin::Coin<"));
        assert!(rendered.ends_with("::sui::SUI>>"));
    }

    #[test]
    fn test_parse_primitives_and_vectors() {
        assert_eq!(TypeTag::from_str("u64").unwrap(), TypeTag::U64);
        assert_eq!(
            TypeTag::from_str("vector<vector<u8>>").unwrap(),
            TypeTag::Vector(Box::new(TypeTag::Vector(Box::new(TypeTag::U8))))
        );
    }

    #[test]
    fn test_parse_multiple_params() {
        let tag = TypeTag::from_str("0x1::m::Pair<u8, 0x2::sui::SUI>").unwrap();
        let TypeTag::Struct(s) = tag else { panic!("expected struct") };
        assert_eq!(s.type_params.len(), 2);
        assert_eq!(s.type_params[0], TypeTag::U8);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(TypeTag::from_str("0x2::sui").is_err());
        assert!(TypeTag::from_str("0x2::coin::Coin<u8").is_err());
        assert!(TypeTag::from_str("u64 extra").is_err());
        assert!(TypeTag::from_str("float").is_err());
    }

    #[test]
    fn test_bcs_variant_indices() {
        assert_eq!(bcs::to_bytes(&TypeTag::U64).unwrap(), vec![2]);
        assert_eq!(bcs::to_bytes(&TypeTag::U256).unwrap(), vec![10]);
        let vec_u8 = TypeTag::Vector(Box::new(TypeTag::U8));
        assert_eq!(bcs::to_bytes(&vec_u8).unwrap(), vec![6, 1]);
    }

    #[test]
    fn test_parse_target() {
        let (pkg, module, function) = parse_target("0xabc::sy::deposit").unwrap();
        assert_eq!(pkg, ObjectId::from_str("0xabc").unwrap());
        assert_eq!(module, "sy");
        assert_eq!(function, "deposit");
        assert!(parse_target("0xabc::sy").is_err());
        assert!(parse_target("0xabc::::deposit").is_err());
    }
}
