//! Statements and module declarations.

use gesso_relief::{NodeData, NodeId, TokenKind, VariableKind};

use super::{is_identifier_token, PResult, ScriptParser};

impl ScriptParser<'_, '_> {
    pub(super) fn parse_statement_list(&mut self) -> PResult<Vec<NodeId>> {
        let mut body = Vec::new();
        while !self.at_end() {
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    pub(super) fn parse_statement(&mut self) -> PResult<NodeId> {
        let Some(token) = self.peek() else {
            return Err(self.unexpected());
        };
        if token.kind == TokenKind::Punctuator {
            return match token.value.as_str() {
                "{" => self.parse_block(),
                ";" => {
                    let start = self.start();
                    self.bump()?;
                    Ok(self.alloc(start, NodeData::EmptyStatement))
                }
                _ => self.parse_expression_statement(),
            };
        }
        if !matches!(token.kind, TokenKind::Keyword | TokenKind::Identifier) {
            return self.parse_expression_statement();
        }

        match token.value.as_str() {
            "var" | "const" => self.parse_variable_statement(),
            "let" if self.let_starts_declaration() => self.parse_variable_statement(),
            "function" => self.parse_function(true),
            "async"
                if self
                    .peek_nth(1)
                    .is_some_and(|next| next.is_word("function"))
                    && !self.line_break_after_nth(0) =>
            {
                self.parse_function(true)
            }
            "class" => self.parse_class(true),
            "if" => self.parse_if(),
            "for" => self.parse_for(),
            "while" => self.parse_while(),
            "do" => self.parse_do_while(),
            "switch" => self.parse_switch(),
            "try" => self.parse_try(),
            "return" => self.parse_return(),
            "break" | "continue" => self.parse_break_continue(),
            "throw" => self.parse_throw(),
            "debugger" => {
                let start = self.start();
                self.bump()?;
                self.consume_semicolon()?;
                Ok(self.alloc(start, NodeData::DebuggerStatement))
            }
            "import" if !self.nth_is_punct(1, "(") && !self.nth_is_punct(1, ".") => {
                self.parse_import()
            }
            "export" => self.parse_export(),
            _ if token.kind == TokenKind::Identifier && self.nth_is_punct(1, ":") => {
                self.parse_labeled()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn let_starts_declaration(&self) -> bool {
        self.peek_nth(1)
            .is_some_and(|next| is_identifier_token(next) || next.is_punct("[") || next.is_punct("{"))
    }

    pub(super) fn parse_block(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_punct("{")?;
        let mut body = Vec::new();
        while !self.is_punct("}") {
            if self.at_end() {
                return Err(self.unexpected());
            }
            body.push(self.parse_statement()?);
        }
        self.bump()?;
        Ok(self.alloc(start, NodeData::BlockStatement { body }))
    }

    fn parse_expression_statement(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let expression = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(self.alloc(start, NodeData::ExpressionStatement { expression }))
    }

    fn parse_variable_statement(&mut self) -> PResult<NodeId> {
        let declaration = self.parse_variable_declaration()?;
        self.consume_semicolon()?;
        self.extend_to_prev(declaration);
        Ok(declaration)
    }

    /// `var`/`let`/`const` with its declarators, without the terminator
    fn parse_variable_declaration(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let keyword = self.bump()?;
        let kind = match keyword.value.as_str() {
            "var" => VariableKind::Var,
            "let" => VariableKind::Let,
            "const" => VariableKind::Const,
            _ => return Err(self.unexpected_token(keyword)),
        };
        let mut declarations = Vec::new();
        loop {
            let declarator_start = self.start();
            let id = self.parse_binding_target()?;
            let init = if self.eat_punct("=") {
                Some(self.parse_assign()?)
            } else {
                None
            };
            declarations.push(self.alloc(declarator_start, NodeData::VariableDeclarator { id, init }));
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(self.alloc(start, NodeData::VariableDeclaration { kind, declarations }))
    }

    fn parse_if(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("if")?;
        self.expect_punct("(")?;
        let test = self.parse_expression()?;
        self.expect_punct(")")?;
        let consequent = self.parse_statement()?;
        let alternate = if self.is_word("else") {
            self.bump()?;
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(self.alloc(
            start,
            NodeData::IfStatement {
                test,
                consequent,
                alternate,
            },
        ))
    }

    fn parse_for(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("for")?;
        let is_await = if self.is_word("await") {
            self.bump()?;
            true
        } else {
            false
        };
        self.expect_punct("(")?;

        let init = if self.is_punct(";") {
            None
        } else {
            let saved = std::mem::replace(&mut self.no_in, true);
            let init = if self.is_word("var")
                || self.is_word("const")
                || (self.is_word("let") && self.let_starts_declaration())
            {
                self.parse_variable_declaration()
            } else {
                self.parse_expression()
            };
            self.no_in = saved;
            Some(init?)
        };

        if let Some(left) = init {
            if self.is_word("of") || self.is_word("in") {
                let of = self.is_word("of");
                self.bump()?;
                let right = if of {
                    self.parse_assign()?
                } else {
                    self.parse_expression()?
                };
                self.expect_punct(")")?;
                let body = self.parse_statement()?;
                let data = if of {
                    NodeData::ForOfStatement {
                        left,
                        right,
                        body,
                        is_await,
                    }
                } else {
                    NodeData::ForInStatement { left, right, body }
                };
                return Ok(self.alloc(start, data));
            }
        }

        self.expect_punct(";")?;
        let test = if self.is_punct(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punct(";")?;
        let update = if self.is_punct(")") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punct(")")?;
        let body = self.parse_statement()?;
        Ok(self.alloc(
            start,
            NodeData::ForStatement {
                init,
                test,
                update,
                body,
            },
        ))
    }

    fn parse_while(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("while")?;
        self.expect_punct("(")?;
        let test = self.parse_expression()?;
        self.expect_punct(")")?;
        let body = self.parse_statement()?;
        Ok(self.alloc(start, NodeData::WhileStatement { test, body }))
    }

    fn parse_do_while(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("do")?;
        let body = self.parse_statement()?;
        self.expect_word("while")?;
        self.expect_punct("(")?;
        let test = self.parse_expression()?;
        self.expect_punct(")")?;
        self.eat_punct(";");
        Ok(self.alloc(start, NodeData::DoWhileStatement { body, test }))
    }

    fn parse_switch(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("switch")?;
        self.expect_punct("(")?;
        let discriminant = self.parse_expression()?;
        self.expect_punct(")")?;
        self.expect_punct("{")?;
        let mut cases = Vec::new();
        while !self.is_punct("}") {
            let case_start = self.start();
            let test = if self.is_word("case") {
                self.bump()?;
                Some(self.parse_expression()?)
            } else {
                self.expect_word("default")?;
                None
            };
            self.expect_punct(":")?;
            let mut consequent = Vec::new();
            while !self.is_punct("}") && !self.is_word("case") && !self.is_word("default") {
                if self.at_end() {
                    return Err(self.unexpected());
                }
                consequent.push(self.parse_statement()?);
            }
            cases.push(self.alloc(case_start, NodeData::SwitchCase { test, consequent }));
        }
        self.bump()?;
        Ok(self.alloc(
            start,
            NodeData::SwitchStatement {
                discriminant,
                cases,
            },
        ))
    }

    fn parse_try(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("try")?;
        let block = self.parse_block()?;
        let handler = if self.is_word("catch") {
            let catch_start = self.start();
            self.bump()?;
            let param = if self.eat_punct("(") {
                let param = self.parse_binding_target()?;
                self.expect_punct(")")?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(self.alloc(catch_start, NodeData::CatchClause { param, body }))
        } else {
            None
        };
        let finalizer = if self.is_word("finally") {
            self.bump()?;
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected());
        }
        Ok(self.alloc(
            start,
            NodeData::TryStatement {
                block,
                handler,
                finalizer,
            },
        ))
    }

    /// Whether the current token may start an argument on the same line
    fn has_same_line_argument(&self) -> bool {
        !(self.at_end() || self.is_punct(";") || self.is_punct("}") || self.line_break_before())
    }

    fn parse_return(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("return")?;
        let argument = if self.has_same_line_argument() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(self.alloc(start, NodeData::ReturnStatement { argument }))
    }

    fn parse_break_continue(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let keyword = self.bump()?;
        let label = if self.has_same_line_argument() && self.peek().is_some_and(is_identifier_token)
        {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        self.consume_semicolon()?;
        let data = if keyword.value == "break" {
            NodeData::BreakStatement { label }
        } else {
            NodeData::ContinueStatement { label }
        };
        Ok(self.alloc(start, data))
    }

    fn parse_throw(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("throw")?;
        if !self.has_same_line_argument() {
            return Err(self.unexpected());
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(self.alloc(start, NodeData::ThrowStatement { argument }))
    }

    fn parse_labeled(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let label = self.parse_identifier()?;
        self.expect_punct(":")?;
        let body = self.parse_statement()?;
        Ok(self.alloc(start, NodeData::LabeledStatement { label, body }))
    }

    fn parse_module_source(&mut self) -> PResult<NodeId> {
        let start = self.start();
        let token = self.bump()?;
        if token.kind != TokenKind::String {
            return Err(self.unexpected_token(token));
        }
        Ok(self.alloc(
            start,
            NodeData::Literal {
                raw: token.value.clone(),
            },
        ))
    }

    /// Identifier or string used as an imported or exported name
    fn parse_module_export_name(&mut self) -> PResult<NodeId> {
        if self.peek().is_some_and(|token| token.kind == TokenKind::String) {
            self.parse_module_source()
        } else {
            self.parse_identifier_name()
        }
    }

    fn parse_import(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("import")?;
        let mut specifiers = Vec::new();

        if self.peek().is_some_and(|token| token.kind == TokenKind::String) {
            let source = self.parse_module_source()?;
            self.consume_semicolon()?;
            return Ok(self.alloc(start, NodeData::ImportDeclaration { specifiers, source }));
        }

        if self.peek().is_some_and(is_identifier_token) {
            let default_start = self.start();
            let local = self.parse_identifier()?;
            specifiers.push(self.alloc(default_start, NodeData::ImportDefaultSpecifier { local }));
            if !self.eat_punct(",") {
                return self.finish_import(start, specifiers);
            }
        }

        if self.is_punct("*") {
            let namespace_start = self.start();
            self.bump()?;
            self.expect_word("as")?;
            let local = self.parse_identifier()?;
            specifiers.push(self.alloc(namespace_start, NodeData::ImportNamespaceSpecifier { local }));
        } else {
            self.expect_punct("{")?;
            while !self.is_punct("}") {
                let specifier_start = self.start();
                let imported = self.parse_module_export_name()?;
                let local = if self.is_word("as") {
                    self.bump()?;
                    Some(self.parse_identifier()?)
                } else {
                    None
                };
                specifiers.push(self.alloc(
                    specifier_start,
                    NodeData::ImportSpecifier { imported, local },
                ));
                if !self.eat_punct(",") {
                    break;
                }
            }
            self.expect_punct("}")?;
        }
        self.finish_import(start, specifiers)
    }

    fn finish_import(&mut self, start: u32, specifiers: Vec<NodeId>) -> PResult<NodeId> {
        self.expect_word("from")?;
        let source = self.parse_module_source()?;
        self.consume_semicolon()?;
        Ok(self.alloc(start, NodeData::ImportDeclaration { specifiers, source }))
    }

    fn parse_export(&mut self) -> PResult<NodeId> {
        let start = self.start();
        self.expect_word("export")?;

        if self.is_word("default") {
            self.bump()?;
            let declaration = if self.is_word("function")
                || (self.is_word("async")
                    && self
                        .peek_nth(1)
                        .is_some_and(|next| next.is_word("function")))
            {
                self.parse_function(true)?
            } else if self.is_word("class") {
                self.parse_class(true)?
            } else {
                let expression = self.parse_assign()?;
                self.consume_semicolon()?;
                expression
            };
            return Ok(self.alloc(start, NodeData::ExportDefaultDeclaration { declaration }));
        }

        if self.eat_punct("*") {
            let exported = if self.is_word("as") {
                self.bump()?;
                Some(self.parse_module_export_name()?)
            } else {
                None
            };
            self.expect_word("from")?;
            let source = self.parse_module_source()?;
            self.consume_semicolon()?;
            return Ok(self.alloc(start, NodeData::ExportAllDeclaration { exported, source }));
        }

        if self.eat_punct("{") {
            let mut specifiers = Vec::new();
            while !self.is_punct("}") {
                let specifier_start = self.start();
                let local = self.parse_module_export_name()?;
                let exported = if self.is_word("as") {
                    self.bump()?;
                    Some(self.parse_module_export_name()?)
                } else {
                    None
                };
                specifiers.push(self.alloc(
                    specifier_start,
                    NodeData::ExportSpecifier { local, exported },
                ));
                if !self.eat_punct(",") {
                    break;
                }
            }
            self.expect_punct("}")?;
            let source = if self.is_word("from") {
                self.bump()?;
                Some(self.parse_module_source()?)
            } else {
                None
            };
            self.consume_semicolon()?;
            return Ok(self.alloc(
                start,
                NodeData::ExportNamedDeclaration {
                    declaration: None,
                    specifiers,
                    source,
                },
            ));
        }

        let declaration = match self.peek().map(|token| token.value.as_str()) {
            Some("var" | "let" | "const") => self.parse_variable_statement()?,
            Some("function" | "async") => self.parse_function(true)?,
            Some("class") => self.parse_class(true)?,
            _ => return Err(self.unexpected()),
        };
        Ok(self.alloc(
            start,
            NodeData::ExportNamedDeclaration {
                declaration: Some(declaration),
                specifiers: Vec::new(),
                source: None,
            },
        ))
    }
}
