//! Expressions, patterns, functions and classes.

use gesso_relief::{MethodKind, NodeData, NodeId, PropertyKind, TokenKind};

use super::{is_identifier_token, starts_key, PResult, ScriptParser};

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=",
    "||=", "??=",
];

/// Binding power of a binary operator, highest binds tightest
fn binary_precedence(operator: &str) -> Option<u8> {
    Some(match operator {
        "??" | "||" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" | "===" | "!==" => 6,
        "<" | ">" | "<=" | ">=" | "instanceof" | "in" => 7,
        "<<" | ">>" | ">>>" => 8,
        "+" | "-" => 9,
        "*" | "/" | "%" => 10,
        "**" => 11,
        _ => return None,
    })
}

/// Accessor or generator markers in front of a member key
#[derive(Default)]
struct MemberPrefix {
    is_async: bool,
    generator: bool,
    accessor: Option<PropertyKind>,
}

impl ScriptParser<'_, '_> {
    /// Expression including the comma operator
    pub(super) fn parse_expression(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let first = self.parse_assign()?;
        if !self.is_punct(",") {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat_punct(",") {
            expressions.push(self.parse_assign()?);
        }
        Ok(self.alloc(start, NodeData::SequenceExpression { expressions }))
    }

    pub(super) fn parse_assign(&mut self) -> PResult<NodeId> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }
        if self.is_word("yield") && self.peek().is_some_and(|t| t.kind == TokenKind::Keyword) {
            return self.parse_yield();
        }

        let start = self.start();
        let left = self.parse_conditional()?;
        let Some(operator) = self
            .peek()
            .filter(|token| token.kind == TokenKind::Punctuator)
            .filter(|token| ASSIGNMENT_OPERATORS.contains(&token.value.as_str()))
        else {
            return Ok(left);
        };
        self.bump()?;
        let right = self.parse_assign()?;
        Ok(self.alloc(
            start,
            NodeData::AssignmentExpression {
                operator: operator.value.clone(),
                left,
                right,
            },
        ))
    }

    fn parse_yield(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.bump()?;
        let delegate = self.eat_punct("*");
        let ends = self.at_end()
            || self.line_break_before()
            || [")", "]", "}", ",", ";", ":"]
                .iter()
                .any(|value| self.is_punct(value));
        let argument = if ends && !delegate {
            None
        } else {
            Some(self.parse_assign()?)
        };
        Ok(self.alloc(start, NodeData::YieldExpression { argument, delegate }))
    }

    /// Index of the `)` matching the `(` at `open`, counted in tokens
    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (index, token) in self.tokens.iter().enumerate().skip(open) {
            if token.kind != TokenKind::Punctuator {
                continue;
            }
            match token.value.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return (token.value == ")").then_some(index);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn try_parse_arrow(&mut self) -> PResult<Option<NodeId>> {
        let start = self.start();
        let is_async = self.is_word("async")
            && !self.line_break_after_nth(0)
            && (self.nth_is_punct(1, "(") || self.peek_nth(1).is_some_and(is_identifier_token))
            && !self.nth_is_punct(1, "=>");
        let head = self.pos + usize::from(is_async);

        let params_end = match self.tokens.get(head) {
            Some(token) if is_identifier_token(token) => head,
            Some(token) if token.is_punct("(") => match self.matching_paren(head) {
                Some(close) => close,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        let arrow = self.tokens.get(params_end + 1);
        let same_line = self
            .tokens
            .get(params_end)
            .zip(arrow)
            .is_some_and(|(last, arrow)| arrow.loc.start.line == last.loc.end.line);
        if !(arrow.is_some_and(|token| token.is_punct("=>")) && same_line) {
            return Ok(None);
        }

        if is_async {
            self.bump()?;
        }
        let params = if self.is_punct("(") {
            self.parse_params()?
        } else {
            vec![self.parse_identifier()?]
        };
        self.expect_punct("=>")?;
        let (body, expression) = if self.is_punct("{") {
            (self.parse_block()?, false)
        } else {
            let saved = std::mem::replace(&mut self.no_in, false);
            let body = self.parse_assign();
            self.no_in = saved;
            (body?, true)
        };
        Ok(Some(self.alloc(
            start,
            NodeData::ArrowFunctionExpression {
                params,
                body,
                is_async,
                expression,
            },
        )))
    }

    fn parse_conditional(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let test = self.parse_binary(1)?;
        if !self.eat_punct("?") {
            return Ok(test);
        }
        let saved = std::mem::replace(&mut self.no_in, false);
        let consequent = self.parse_assign();
        self.no_in = saved;
        let consequent = consequent?;
        self.expect_punct(":")?;
        let alternate = self.parse_assign()?;
        Ok(self.alloc(
            start,
            NodeData::ConditionalExpression {
                test,
                consequent,
                alternate,
            },
        ))
    }

    fn current_binary_precedence(&self) -> Option<u8> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Punctuator => binary_precedence(&token.value),
            TokenKind::Keyword if token.value == "instanceof" => binary_precedence("instanceof"),
            TokenKind::Keyword if token.value == "in" && !self.no_in => binary_precedence("in"),
            _ => None,
        }
    }

    fn parse_binary(&mut self, min_precedence: u8) -> PResult<NodeId> {
        let start = self.start();
        let mut left = self.parse_unary()?;
        while let Some(precedence) = self.current_binary_precedence() {
            if precedence < min_precedence {
                break;
            }
            let operator = self.bump()?.value.clone();
            let next_min = if operator == "**" {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_binary(next_min)?;
            let data = if matches!(operator.as_str(), "||" | "&&" | "??") {
                NodeData::LogicalExpression {
                    operator,
                    left,
                    right,
                }
            } else {
                NodeData::BinaryExpression {
                    operator,
                    left,
                    right,
                }
            };
            left = self.alloc(start, data);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let Some(token) = self.peek() else {
            return Err(self.unexpected());
        };
        let is_unary = match token.kind {
            TokenKind::Punctuator => matches!(token.value.as_str(), "!" | "~" | "+" | "-"),
            TokenKind::Keyword => matches!(token.value.as_str(), "typeof" | "void" | "delete"),
            _ => false,
        };
        if is_unary {
            self.bump()?;
            let argument = self.parse_unary()?;
            return Ok(self.alloc(
                start,
                NodeData::UnaryExpression {
                    operator: token.value.clone(),
                    argument,
                },
            ));
        }
        if token.is_punct("++") || token.is_punct("--") {
            self.bump()?;
            let argument = self.parse_unary()?;
            return Ok(self.alloc(
                start,
                NodeData::UpdateExpression {
                    operator: token.value.clone(),
                    prefix: true,
                    argument,
                },
            ));
        }
        if token.kind == TokenKind::Keyword && token.value == "await" && self.await_has_argument() {
            self.bump()?;
            let argument = self.parse_unary()?;
            return Ok(self.alloc(start, NodeData::AwaitExpression { argument }));
        }

        let argument = self.parse_lhs()?;
        if (self.is_punct("++") || self.is_punct("--")) && !self.line_break_before() {
            let operator = self.bump()?.value.clone();
            return Ok(self.alloc(
                start,
                NodeData::UpdateExpression {
                    operator,
                    prefix: false,
                    argument,
                },
            ));
        }
        Ok(argument)
    }

    fn await_has_argument(&self) -> bool {
        self.peek_nth(1).is_some_and(|next| {
            !(next.kind == TokenKind::Punctuator
                && matches!(next.value.as_str(), ")" | "]" | "}" | "," | ";" | ":" | "=" | "."))
        })
    }

    /// Call, member and `new` expressions
    fn parse_lhs(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let head = if self.is_word("new") {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        self.parse_chain(start, head, true)
    }

    fn parse_new(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("new")?;
        if self.eat_punct(".") {
            // `new.target`
            let property = self.bump()?;
            return Ok(self.alloc(
                start,
                NodeData::Identifier {
                    name: format!("new.{}", property.value).into(),
                },
            ));
        }
        let callee_start = self.start();
        let callee = if self.is_word("new") {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        let callee = self.parse_chain(callee_start, callee, false)?;
        let has_arguments = self.is_punct("(");
        let arguments = if has_arguments {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(self.alloc(
            start,
            NodeData::NewExpression {
                callee,
                arguments,
                has_arguments,
            },
        ))
    }

    fn parse_chain(&mut self, start: u32, mut object: NodeId, allow_call: bool) -> PResult<NodeId> {
        loop {
            if self.eat_punct(".") {
                let property = self.parse_identifier_name()?;
                object = self.alloc(
                    start,
                    NodeData::MemberExpression {
                        object,
                        property,
                        computed: false,
                        optional: false,
                    },
                );
            } else if allow_call && self.eat_punct("?.") {
                if self.is_punct("(") {
                    let arguments = self.parse_arguments()?;
                    object = self.alloc(
                        start,
                        NodeData::CallExpression {
                            callee: object,
                            arguments,
                            optional: true,
                        },
                    );
                } else if self.eat_punct("[") {
                    let property = self.parse_expression()?;
                    self.expect_punct("]")?;
                    object = self.alloc(
                        start,
                        NodeData::MemberExpression {
                            object,
                            property,
                            computed: true,
                            optional: true,
                        },
                    );
                } else {
                    let property = self.parse_identifier_name()?;
                    object = self.alloc(
                        start,
                        NodeData::MemberExpression {
                            object,
                            property,
                            computed: false,
                            optional: true,
                        },
                    );
                }
            } else if self.eat_punct("[") {
                let saved = std::mem::replace(&mut self.no_in, false);
                let property = self.parse_expression();
                self.no_in = saved;
                let property = property?;
                self.expect_punct("]")?;
                object = self.alloc(
                    start,
                    NodeData::MemberExpression {
                        object,
                        property,
                        computed: true,
                        optional: false,
                    },
                );
            } else if allow_call && self.is_punct("(") {
                let arguments = self.parse_arguments()?;
                object = self.alloc(
                    start,
                    NodeData::CallExpression {
                        callee: object,
                        arguments,
                        optional: false,
                    },
                );
            } else if self.is_template_start() {
                let quasi = self.parse_template()?;
                object = self.alloc(start, NodeData::TaggedTemplateExpression { tag: object, quasi });
            } else {
                return Ok(object);
            }
        }
    }

    pub(super) fn parse_arguments(&mut self) -> PResult<Vec<NodeId>> {
        self.expect_punct("(")?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let arguments = self.parse_argument_list();
        self.no_in = saved;
        let arguments = arguments?;
        self.expect_punct(")")?;
        Ok(arguments)
    }

    fn parse_argument_list(&mut self) -> PResult<Vec<NodeId>> {
        let mut arguments = Vec::new();
        while !self.is_punct(")") {
            arguments.push(self.parse_spread_or_assign()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(arguments)
    }

    fn parse_spread_or_assign(&mut self) -> PResult<NodeId> {
        let start = self.start();
        if self.eat_punct("...") {
            let argument = self.parse_assign()?;
            Ok(self.alloc(start, NodeData::SpreadElement { argument }))
        } else {
            self.parse_assign()
        }
    }

    fn is_template_start(&self) -> bool {
        self.peek()
            .is_some_and(|token| token.kind == TokenKind::Template && token.value.starts_with('`'))
    }

    fn parse_primary(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let Some(token) = self.peek() else {
            return Err(self.unexpected());
        };
        match token.kind {
            TokenKind::Numeric | TokenKind::String | TokenKind::RegularExpression => {
                self.bump()?;
                Ok(self.alloc(
                    start,
                    NodeData::Literal {
                        raw: token.value.clone(),
                    },
                ))
            }
            TokenKind::Template if token.value.starts_with('`') => self.parse_template(),
            TokenKind::Identifier => {
                if token.value == "async"
                    && self
                        .peek_nth(1)
                        .is_some_and(|next| next.is_word("function"))
                    && !self.line_break_after_nth(0)
                {
                    return self.parse_function(false);
                }
                self.bump()?;
                Ok(self.alloc(
                    start,
                    NodeData::Identifier {
                        name: token.value.clone(),
                    },
                ))
            }
            TokenKind::Keyword => match token.value.as_str() {
                "this" => {
                    self.bump()?;
                    Ok(self.alloc(start, NodeData::ThisExpression))
                }
                "super" => {
                    self.bump()?;
                    Ok(self.alloc(start, NodeData::Super))
                }
                "null" | "true" | "false" => {
                    self.bump()?;
                    Ok(self.alloc(
                        start,
                        NodeData::Literal {
                            raw: token.value.clone(),
                        },
                    ))
                }
                "function" => self.parse_function(false),
                "class" => self.parse_class(false),
                "let" | "static" | "yield" | "await" | "import" => {
                    self.bump()?;
                    Ok(self.alloc(
                        start,
                        NodeData::Identifier {
                            name: token.value.clone(),
                        },
                    ))
                }
                _ => Err(self.unexpected()),
            },
            TokenKind::Punctuator => match token.value.as_str() {
                "(" => {
                    self.bump()?;
                    let saved = std::mem::replace(&mut self.no_in, false);
                    let expression = self.parse_expression();
                    self.no_in = saved;
                    let expression = expression?;
                    self.expect_punct(")")?;
                    Ok(expression)
                }
                "[" => self.parse_array(),
                "{" => self.parse_object(),
                _ => Err(self.unexpected()),
            },
            _ => Err(self.unexpected()),
        }
    }

    fn parse_template(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let chunk_start = self.start();
            let chunk = self.bump()?;
            if chunk.kind != TokenKind::Template {
                return Err(self.unexpected_token(chunk));
            }
            quasis.push(self.alloc(chunk_start, NodeData::TemplateElement));
            if !chunk.value.ends_with("${") {
                break;
            }
            let saved = std::mem::replace(&mut self.no_in, false);
            let expression = self.parse_expression();
            self.no_in = saved;
            expressions.push(expression?);
            if !self
                .peek()
                .is_some_and(|token| token.kind == TokenKind::Template && token.value.starts_with('}'))
            {
                return Err(self.unexpected());
            }
        }
        Ok(self.alloc(
            start,
            NodeData::TemplateLiteral {
                quasis,
                expressions,
            },
        ))
    }

    fn parse_array(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_punct("[")?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let elements = self.parse_array_elements(false);
        self.no_in = saved;
        let elements = elements?;
        self.expect_punct("]")?;
        Ok(self.alloc(start, NodeData::ArrayExpression { elements }))
    }

    /// Elements up to (not including) `]`; holes are `None`
    fn parse_array_elements(&mut self, binding: bool) -> PResult<Vec<Option<NodeId>>> {
        let mut elements = Vec::new();
        while !self.is_punct("]") {
            if self.eat_punct(",") {
                elements.push(None);
                continue;
            }
            let element = if binding {
                self.parse_binding_element()?
            } else {
                self.parse_spread_or_assign()?
            };
            elements.push(Some(element));
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(elements)
    }

    fn parse_object(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_punct("{")?;
        let saved = std::mem::replace(&mut self.no_in, false);
        let properties = self.parse_object_members();
        self.no_in = saved;
        let properties = properties?;
        self.expect_punct("}")?;
        Ok(self.alloc(start, NodeData::ObjectExpression { properties }))
    }

    fn parse_object_members(&mut self) -> PResult<Vec<NodeId>> {
        let mut properties = Vec::new();
        while !self.is_punct("}") {
            properties.push(self.parse_object_member()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(properties)
    }

    fn parse_object_member(&mut self) -> PResult<NodeId> {
        let start = self.start();
        if self.eat_punct("...") {
            let argument = self.parse_assign()?;
            return Ok(self.alloc(start, NodeData::SpreadElement { argument }));
        }

        let prefix = self.parse_member_prefix()?;
        let (key, computed) = self.parse_property_key()?;

        if self.is_punct("(") {
            let value = self.parse_method_value(prefix.is_async, prefix.generator)?;
            return Ok(self.alloc(
                start,
                NodeData::Property {
                    key,
                    value: Some(value),
                    kind: prefix.accessor.unwrap_or(PropertyKind::Init),
                    computed,
                    shorthand: false,
                    method: prefix.accessor.is_none(),
                },
            ));
        }
        if self.eat_punct(":") {
            let value = self.parse_assign()?;
            return Ok(self.alloc(
                start,
                NodeData::Property {
                    key,
                    value: Some(value),
                    kind: PropertyKind::Init,
                    computed,
                    shorthand: false,
                    method: false,
                },
            ));
        }

        let key = if self.eat_punct("=") {
            // shorthand with a default, only valid as a pattern
            let right = self.parse_assign()?;
            self.alloc(start, NodeData::AssignmentPattern { left: key, right })
        } else {
            key
        };
        Ok(self.alloc(
            start,
            NodeData::Property {
                key,
                value: None,
                kind: PropertyKind::Init,
                computed,
                shorthand: true,
                method: false,
            },
        ))
    }

    /// `async`, `*`, `get` and `set` in front of a key
    fn parse_member_prefix(&mut self) -> PResult<MemberPrefix> {
        let mut prefix = MemberPrefix::default();
        if self.is_word("async") && self.nth_starts_key(1) && !self.line_break_after_nth(0) {
            self.bump()?;
            prefix.is_async = true;
        }
        if self.eat_punct("*") {
            prefix.generator = true;
        }
        if !prefix.is_async
            && !prefix.generator
            && (self.is_word("get") || self.is_word("set"))
            && self.nth_starts_key(1)
        {
            let token = self.bump()?;
            prefix.accessor = Some(if token.value == "get" {
                PropertyKind::Get
            } else {
                PropertyKind::Set
            });
        }
        Ok(prefix)
    }

    fn nth_starts_key(&self, n: usize) -> bool {
        self.peek_nth(n).is_some_and(starts_key)
    }

    /// Returns the key and whether it is computed
    fn parse_property_key(&mut self) -> PResult<(NodeId, bool)> {
        let start = self.start();
        if self.eat_punct("[") {
            let key = self.parse_assign()?;
            self.expect_punct("]")?;
            return Ok((key, true));
        }
        let token = self.bump()?;
        let data = match token.kind {
            TokenKind::Identifier | TokenKind::Keyword => NodeData::Identifier {
                name: token.value.clone(),
            },
            TokenKind::String | TokenKind::Numeric => NodeData::Literal {
                raw: token.value.clone(),
            },
            _ => return Err(self.unexpected_token(token)),
        };
        Ok((self.alloc(start, data), false))
    }

    /// A method's function, spanning its parameters and body
    fn parse_method_value(&mut self, is_async: bool, generator: bool) -> PResult<NodeId> {
        let start = self.start();
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(self.alloc(
            start,
            NodeData::FunctionExpression {
                id: None,
                params,
                body,
                is_async,
                generator,
            },
        ))
    }

    pub(super) fn parse_function(&mut self, declaration: bool) -> PResult<NodeId> {
        let start = self.start();
        let is_async = if self.is_word("async") {
            self.bump()?;
            true
        } else {
            false
        };
        self.expect_word("function")?;
        let generator = self.eat_punct("*");
        let id = if self.peek().is_some_and(is_identifier_token) {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        let data = if declaration {
            NodeData::FunctionDeclaration {
                id,
                params,
                body,
                is_async,
                generator,
            }
        } else {
            NodeData::FunctionExpression {
                id,
                params,
                body,
                is_async,
                generator,
            }
        };
        Ok(self.alloc(start, data))
    }

    pub(super) fn parse_params(&mut self) -> PResult<Vec<NodeId>> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        while !self.is_punct(")") {
            params.push(self.parse_binding_element()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        Ok(params)
    }

    /// Binding target with an optional default, or a rest element
    fn parse_binding_element(&mut self) -> PResult<NodeId> {
        let start = self.start();
        if self.eat_punct("...") {
            let argument = self.parse_binding_target()?;
            return Ok(self.alloc(start, NodeData::RestElement { argument }));
        }
        let target = self.parse_binding_target()?;
        if self.eat_punct("=") {
            let right = self.parse_assign()?;
            return Ok(self.alloc(start, NodeData::AssignmentPattern { left: target, right }));
        }
        Ok(target)
    }

    pub(super) fn parse_binding_target(&mut self) -> PResult<NodeId> {
        let start = self.start();
        if self.eat_punct("[") {
            let elements = self.parse_array_elements(true)?;
            self.expect_punct("]")?;
            return Ok(self.alloc(start, NodeData::ArrayPattern { elements }));
        }
        if self.eat_punct("{") {
            let mut properties = Vec::new();
            while !self.is_punct("}") {
                properties.push(self.parse_binding_property()?);
                if !self.eat_punct(",") {
                    break;
                }
            }
            self.expect_punct("}")?;
            return Ok(self.alloc(start, NodeData::ObjectPattern { properties }));
        }
        self.parse_identifier()
    }

    fn parse_binding_property(&mut self) -> PResult<NodeId> {
        let start = self.start();
        if self.eat_punct("...") {
            let argument = self.parse_binding_target()?;
            return Ok(self.alloc(start, NodeData::RestElement { argument }));
        }
        let (key, computed) = self.parse_property_key()?;
        if self.eat_punct(":") {
            let value = self.parse_binding_element()?;
            return Ok(self.alloc(
                start,
                NodeData::Property {
                    key,
                    value: Some(value),
                    kind: PropertyKind::Init,
                    computed,
                    shorthand: false,
                    method: false,
                },
            ));
        }
        let key = if self.eat_punct("=") {
            let right = self.parse_assign()?;
            self.alloc(start, NodeData::AssignmentPattern { left: key, right })
        } else {
            key
        };
        Ok(self.alloc(
            start,
            NodeData::Property {
                key,
                value: None,
                kind: PropertyKind::Init,
                computed,
                shorthand: true,
                method: false,
            },
        ))
    }

    pub(super) fn parse_class(&mut self, declaration: bool) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("class")?;
        let id = if self.peek().is_some_and(is_identifier_token) {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let super_class = if self.is_word("extends") {
            self.bump()?;
            Some(self.parse_lhs()?)
        } else {
            None
        };
        let body = self.parse_class_body()?;
        let data = if declaration {
            NodeData::ClassDeclaration {
                id,
                super_class,
                body,
            }
        } else {
            NodeData::ClassExpression {
                id,
                super_class,
                body,
            }
        };
        Ok(self.alloc(start, data))
    }

    fn parse_class_body(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_punct("{")?;
        let mut body = Vec::new();
        while !self.is_punct("}") {
            if self.at_end() {
                return Err(self.unexpected());
            }
            if self.eat_punct(";") {
                continue;
            }
            body.push(self.parse_class_member()?);
        }
        self.bump()?;
        Ok(self.alloc(start, NodeData::ClassBody { body }))
    }

    fn parse_class_member(&mut self) -> PResult<NodeId> {
        let mut decorators = Vec::new();
        while self.is_punct("@") {
            let decorator_start = self.start();
            self.bump()?;
            let expression_start = self.start();
            let head = if self.is_punct("(") {
                self.parse_primary()?
            } else {
                self.parse_identifier()?
            };
            let expression = self.parse_chain(expression_start, head, true)?;
            decorators.push(self.alloc(decorator_start, NodeData::Decorator { expression }));
        }

        // the member itself starts after its decorators
        let start = self.start();
        let is_static = self.is_word("static") && self.nth_starts_key(1);
        if is_static {
            self.bump()?;
        }
        let prefix = self.parse_member_prefix()?;
        let (key, computed) = self.parse_property_key()?;

        if self.is_punct("(") {
            let value = self.parse_method_value(prefix.is_async, prefix.generator)?;
            let is_constructor = !is_static
                && !computed
                && matches!(self.data(key), NodeData::Identifier { name } if name == "constructor");
            let kind = match prefix.accessor {
                Some(PropertyKind::Get) => MethodKind::Get,
                Some(PropertyKind::Set) => MethodKind::Set,
                _ if is_constructor => MethodKind::Constructor,
                _ => MethodKind::Method,
            };
            return Ok(self.alloc(
                start,
                NodeData::MethodDefinition {
                    decorators,
                    key,
                    value,
                    kind,
                    computed,
                    is_static,
                },
            ));
        }

        let value = if self.eat_punct("=") {
            Some(self.parse_assign()?)
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(self.alloc(
            start,
            NodeData::PropertyDefinition {
                decorators,
                key,
                value,
                computed,
                is_static,
            },
        ))
    }

    pub(super) fn parse_identifier(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let token = self.bump()?;
        if !is_identifier_token(token) {
            return Err(self.unexpected_token(token));
        }
        Ok(self.alloc(
            start,
            NodeData::Identifier {
                name: token.value.clone(),
            },
        ))
    }

    /// Any word, including reserved words and private names
    pub(super) fn parse_identifier_name(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let token = self.bump()?;
        if !matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword) {
            return Err(self.unexpected_token(token));
        }
        Ok(self.alloc(
            start,
            NodeData::Identifier {
                name: token.value.clone(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use gesso_relief::{Node, NodeData, NodeKind, Span};

    use crate::script::{lex, parse_expression, LexMode};
    use crate::tokenizer::Scanner;

    fn expression(source: &str) -> (Vec<Node>, Option<gesso_relief::NodeId>) {
        let scanner = Scanner::new(source);
        let output = lex(&scanner, 0, LexMode::Program { end: source.len() });
        let mut nodes = Vec::new();
        let root = parse_expression(&output.tokens, source.len() as u32, &mut nodes)
            .expect("expression should parse");
        (nodes, root)
    }

    #[test]
    fn test_precedence() {
        let (nodes, root) = expression("a + b * c");
        let root = root.unwrap();
        let NodeData::BinaryExpression { operator, right, .. } = &nodes[root.index()].data else {
            panic!("expected a binary expression");
        };
        assert_eq!(operator, "+");
        assert_eq!(nodes[right.index()].kind(), NodeKind::BinaryExpression);
        assert_eq!(nodes[root.index()].span, Span::new(0, 9));
    }

    #[test]
    fn test_parenthesized_span_excludes_parens() {
        let (nodes, root) = expression("(a || b) && c");
        let root = root.unwrap();
        let NodeData::LogicalExpression { left, .. } = &nodes[root.index()].data else {
            panic!("expected a logical expression");
        };
        assert_eq!(nodes[left.index()].span, Span::new(1, 7));
        assert_eq!(nodes[root.index()].span, Span::new(0, 13));
    }

    #[test]
    fn test_conditional_and_template() {
        let (nodes, root) = expression("ok ? `a${b}c` : tag`x`");
        assert_eq!(
            nodes[root.unwrap().index()].kind(),
            NodeKind::ConditionalExpression
        );
        let kinds: Vec<_> = nodes.iter().map(Node::kind).collect();
        assert!(kinds.contains(&NodeKind::TemplateLiteral));
        assert!(kinds.contains(&NodeKind::TaggedTemplateExpression));
    }

    #[test]
    fn test_object_members() {
        let (nodes, _) = expression("{ a, b: 1, [c]: 2, d() {}, get e() { return 1 }, ...f }");
        let properties = nodes
            .iter()
            .filter(|node| node.kind() == NodeKind::Property)
            .count();
        assert_eq!(properties, 5);
        assert!(nodes.iter().any(|node| node.kind() == NodeKind::SpreadElement));
    }

    #[test]
    fn test_empty_expression() {
        let (nodes, root) = expression("   ");
        assert!(root.is_none());
        assert!(nodes.is_empty());
    }
}
