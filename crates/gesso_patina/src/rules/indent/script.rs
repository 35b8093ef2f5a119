//! Offsets of script nodes, for `<wxs>`/`<script>` bodies and mustache
//! expressions alike.

use gesso_armature::TokenQuery;
use gesso_carton::SmallVec;
use gesso_relief::{NodeData, NodeId, NodeKind, NodeRef, TokenId};

use super::node_list::{
    is_arrow, is_close_brace, is_close_bracket, is_close_paren, is_not_close_paren,
    is_not_open_paren, is_open_brace, is_open_bracket, is_open_paren, is_optional_chain,
    is_semicolon, present, Bound,
};
use super::IndentVisitor;

impl<'a> IndentVisitor<'a> {
    pub(super) fn process_script(&mut self, node: NodeRef<'a>) {
        let id = node.id;
        match node.data() {
            NodeData::Program { body } => self.process_program(node, body),
            NodeData::ArrayExpression { elements } | NodeData::ArrayPattern { elements } => {
                self.process_delimited(id, elements, 1);
            }
            NodeData::ObjectExpression { properties } | NodeData::ObjectPattern { properties } => {
                self.process_delimited(id, &present(properties), 1);
            }
            NodeData::BlockStatement { body } | NodeData::ClassBody { body } => {
                self.process_delimited(id, &present(body), 1);
            }
            NodeData::ArrowFunctionExpression {
                params,
                body,
                is_async,
                ..
            } => self.process_arrow(id, params, *body, *is_async),
            NodeData::AssignmentExpression { left, .. }
            | NodeData::AssignmentPattern { left, .. }
            | NodeData::BinaryExpression { left, .. }
            | NodeData::LogicalExpression { left, .. } => self.process_binary_like(node, *left),
            NodeData::AwaitExpression { .. }
            | NodeData::RestElement { .. }
            | NodeData::SpreadElement { .. }
            | NodeData::UnaryExpression { .. }
            | NodeData::UpdateExpression { .. }
            | NodeData::ThrowStatement { .. } => self.indent_second_token(id),
            NodeData::ReturnStatement { argument: Some(_) }
            | NodeData::BreakStatement { label: Some(_) }
            | NodeData::ContinueStatement { label: Some(_) } => self.indent_second_token(id),
            NodeData::CallExpression {
                callee,
                arguments,
                optional,
            } => {
                let first = self.first(id);
                let right = self.last(id);
                let left = self.after_node_where(*callee, is_open_paren);
                if *optional {
                    let question = self
                        .after_node_where(*callee, is_optional_chain)
                        .filter(|question| left.map_or(true, |left| *question < left));
                    self.table.set_offset(question, 1, first);
                }
                self.table.set_offset(left, 1, first);
                self.process_node_list(
                    &present(arguments),
                    left.map(Bound::Token),
                    right.map(Bound::Token),
                    1,
                    true,
                );
            }
            NodeData::NewExpression {
                callee,
                arguments,
                has_arguments,
            } => {
                let new = self.first(id);
                let callee_token = new.and_then(|new| self.after(new));
                let right = self
                    .last(id)
                    .filter(|right| *has_arguments && is_close_paren(self.token(*right)));
                let left = right.and_then(|right| {
                    self.after_node_where(*callee, is_open_paren)
                        .filter(|left| *left < right)
                });
                self.table.set_offset(callee_token, 1, new);
                if let Some(left) = left {
                    self.table.set_offset(Some(left), 1, callee_token);
                    self.process_node_list(
                        &present(arguments),
                        Some(Bound::Token(left)),
                        right.map(Bound::Token),
                        1,
                        true,
                    );
                }
            }
            NodeData::CatchClause { param, body } => {
                let first = self.first(id);
                if let Some(param) = param {
                    let left = first.and_then(|first| self.after(first));
                    let right = self.after_node(*param);
                    self.table.set_offset(left, 1, first);
                    self.process_node_list(
                        &[Some(*param)],
                        left.map(Bound::Token),
                        right.map(Bound::Token),
                        1,
                        true,
                    );
                }
                self.table.set_offset(self.first(*body), 0, first);
            }
            NodeData::ClassDeclaration {
                id: name,
                super_class,
                body,
            }
            | NodeData::ClassExpression {
                id: name,
                super_class,
                body,
            } => {
                let first = self.first(id);
                if let Some(name) = name {
                    self.table.set_offset(self.first(*name), 1, first);
                }
                if super_class.is_some() {
                    let extends = match name {
                        Some(name) => self.after_node(*name),
                        None => first.and_then(|first| self.after(first)),
                    };
                    let super_token = extends.and_then(|extends| self.after(extends));
                    self.table.set_offset(extends, 1, first);
                    self.table.set_offset(super_token, 1, extends);
                }
                self.table.set_offset(self.first(*body), 0, first);
            }
            NodeData::ConditionalExpression {
                test,
                consequent,
                ..
            } => self.process_conditional(node, *test, *consequent),
            NodeData::DoWhileStatement { body, .. } => {
                let do_token = self.first(id);
                let while_token = self.after_node_where(*body, is_not_close_paren);
                let left = while_token.and_then(|token| self.after(token));
                let test_token = left.and_then(|token| self.after(token));
                let right = self.last(id).and_then(|last| {
                    if is_semicolon(self.token(last)) {
                        self.before(last)
                    } else {
                        Some(last)
                    }
                });
                self.process_maybe_block(*body, do_token);
                self.table.set_offset(while_token, 0, do_token);
                self.table.set_offset(left, 1, while_token);
                self.table.set_offset(test_token, 1, left);
                self.table.set_offset(right, 0, left);
            }
            NodeData::WhileStatement { body, .. } => {
                let first = self.first(id);
                let left = first.and_then(|first| self.after(first));
                let right = self.before_node_where(*body, is_close_paren);
                self.table.set_offset(left, 1, first);
                self.table.set_offset(right, 0, left);
                self.process_maybe_block(*body, first);
            }
            NodeData::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                let for_token = self.first(id);
                let left = for_token.and_then(|token| self.after(token));
                let right = self.before_node_where(*body, is_not_open_paren);
                self.table.set_offset(left, 1, for_token);
                self.process_node_list(
                    &[*init, *test, *update],
                    left.map(Bound::Token),
                    right.map(Bound::Token),
                    1,
                    true,
                );
                self.process_maybe_block(*body, for_token);
            }
            NodeData::ForInStatement { left, body, .. } => {
                self.process_for_in_of(id, *left, *body, false);
            }
            NodeData::ForOfStatement {
                left,
                body,
                is_await,
                ..
            } => self.process_for_in_of(id, *left, *body, *is_await),
            NodeData::FunctionDeclaration {
                id: name,
                params,
                body,
                is_async,
                generator,
            }
            | NodeData::FunctionExpression {
                id: name,
                params,
                body,
                is_async,
                generator,
            } => self.process_function(node, *name, params, *body, *is_async, *generator),
            NodeData::IfStatement {
                consequent,
                alternate,
                ..
            } => {
                let if_token = self.first(id);
                let left = if_token.and_then(|token| self.after(token));
                let right = self.before_node_where(*consequent, is_close_paren);
                self.table.set_offset(left, 1, if_token);
                self.table.set_offset(right, 0, left);
                self.process_maybe_block(*consequent, if_token);

                if let Some(alternate) = alternate {
                    let else_token = self.after_node_where(*consequent, is_not_close_paren);
                    self.table.set_offset(else_token, 0, if_token);
                    self.process_maybe_block(*alternate, else_token);
                }
            }
            NodeData::SwitchStatement {
                discriminant,
                cases,
            } => {
                let switch = self.first(id);
                let left = switch.and_then(|token| self.after(token));
                let discriminant_token = left.and_then(|token| self.after(token));
                let left_brace = self.after_node_where(*discriminant, is_open_brace);
                let right = left_brace.and_then(|token| self.before(token));
                let right_brace = self.last(id);
                self.table.set_offset(left, 1, switch);
                self.table.set_offset(discriminant_token, 1, left);
                self.table.set_offset(right, 0, left);
                self.table.set_offset(left_brace, 0, switch);
                self.process_node_list(
                    &present(cases),
                    left_brace.map(Bound::Token),
                    right_brace.map(Bound::Token),
                    self.settings.switch_case,
                    true,
                );
            }
            NodeData::SwitchCase { test, consequent } => {
                let case = self.first(id);
                match test {
                    Some(test) => {
                        let test_token = case.and_then(|token| self.after(token));
                        let colon = self.after_node_where(*test, is_not_close_paren);
                        self.table
                            .set_offsets(test_token.into_iter().chain(colon), 1, case);
                    }
                    None => {
                        let colon = case.and_then(|token| self.after(token));
                        self.table.set_offset(colon, 1, case);
                    }
                }
                match consequent.as_slice() {
                    [] => {}
                    [block] if self.node(*block).kind() == NodeKind::BlockStatement => {
                        self.table.set_offset(self.first(*block), 0, case);
                    }
                    [first, ..] => {
                        self.table.set_offset(self.first(*first), 1, case);
                        self.process_node_list(&present(consequent), None, None, 0, true);
                    }
                }
            }
            NodeData::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                let try_token = self.first(id);
                self.table.set_offset(self.first(*block), 0, try_token);
                if let Some(handler) = handler {
                    self.table.set_offset(self.first(*handler), 0, try_token);
                }
                if let Some(finalizer) = finalizer {
                    let finally = self.before_node(*finalizer);
                    let block = self.first(*finalizer);
                    self.table
                        .set_offsets(finally.into_iter().chain(block), 0, try_token);
                }
            }
            NodeData::LabeledStatement { .. } => {
                let label = self.first(id);
                let colon = label.and_then(|token| self.after(token));
                let body = colon.and_then(|token| self.after(token));
                self.table.set_offsets(colon.into_iter().chain(body), 1, label);
            }
            NodeData::MemberExpression {
                property,
                computed,
                optional,
                ..
            } => {
                let object = self.first(id);
                if *computed {
                    let left = self.before_node_where(*property, is_open_bracket);
                    let property_token = left.and_then(|token| self.after(token));
                    let right = self.after_node_where(*property, is_close_bracket);
                    if *optional {
                        let question = left
                            .and_then(|token| self.before(token))
                            .filter(|token| is_optional_chain(self.token(*token)));
                        self.table.set_offset(question, 1, object);
                    }
                    self.table.set_offset(left, 1, object);
                    self.table.set_offset(property_token, 1, left);
                    self.table.set_offset(right, 0, left);
                } else {
                    let dot = self.before_node(*property);
                    let property_token = dot.and_then(|token| self.after(token));
                    self.table
                        .set_offsets(dot.into_iter().chain(property_token), 1, object);
                }
            }
            NodeData::Property {
                key,
                value,
                computed,
                ..
            }
            | NodeData::PropertyDefinition {
                key,
                value,
                computed,
                ..
            } => self.process_member(id, *key, *value, *computed),
            NodeData::MethodDefinition {
                key,
                value,
                computed,
                ..
            } => self.process_member(id, *key, Some(*value), *computed),
            NodeData::SequenceExpression { expressions } => {
                self.process_node_list(&present(expressions), None, None, 0, true);
            }
            NodeData::TaggedTemplateExpression { tag, .. } => {
                if let Some((first, last)) = self.first_and_last_tokens(*tag, node.span().start) {
                    self.table.set_offset(self.after(last), 1, Some(first));
                }
            }
            NodeData::TemplateLiteral { quasis, .. } => {
                let first = self.first(id);
                if let Some((_, leading)) = quasis.split_last() {
                    let chunks: SmallVec<[TokenId; 4]> = quasis[1..]
                        .iter()
                        .filter_map(|quasi| self.first(*quasi))
                        .collect();
                    let expressions: SmallVec<[TokenId; 4]> = leading
                        .iter()
                        .filter_map(|quasi| self.after_node(*quasi))
                        .collect();
                    self.table.set_offsets(chunks, 1, first);
                    self.table.set_offsets(expressions, 1, first);
                }
            }
            NodeData::VariableDeclaration { declarations, .. } => {
                let first = self.first(id);
                self.process_node_list(
                    &present(declarations),
                    first.map(Bound::Token),
                    None,
                    1,
                    true,
                );
            }
            NodeData::VariableDeclarator {
                id: target,
                init: Some(_),
            } => {
                let first = self.first(id);
                let eq = self.after_node(*target);
                let init = eq.and_then(|token| self.after(token));
                self.table.set_offsets(eq.into_iter().chain(init), 1, first);
            }
            NodeData::YieldExpression {
                argument: Some(_),
                delegate,
            } => {
                let yield_token = self.first(id);
                let next = yield_token.and_then(|token| self.after(token));
                self.table.set_offset(next, 1, yield_token);
                if *delegate {
                    let argument = next.and_then(|token| self.after(token));
                    self.table.set_offset(argument, 1, yield_token);
                }
            }
            NodeData::ImportDeclaration { specifiers, .. } => {
                self.process_import(id, specifiers);
            }
            NodeData::ImportSpecifier { .. } | NodeData::ExportSpecifier { .. } => {
                let tokens = self.store.tokens_of(id, &TokenQuery::CODE);
                if let Some((first, rest)) = tokens.split_first() {
                    self.table.set_offsets(rest.iter().copied(), 1, Some(*first));
                }
            }
            NodeData::ExportNamedDeclaration {
                declaration,
                specifiers,
                ..
            } => {
                let export = self.first(id);
                if declaration.is_some() {
                    self.table
                        .set_offset(self.store.first_token_skip(id, 1), 1, export);
                    return;
                }
                let left = self.store.first_token_skip(id, 1);
                let right = self
                    .store
                    .tokens_of(id, &TokenQuery::CODE)
                    .into_iter()
                    .rev()
                    .find(|token| is_close_brace(self.token(*token)));
                self.table.set_offset(left, 0, export);
                self.process_node_list(
                    &present(specifiers),
                    left.map(Bound::Token),
                    right.map(Bound::Token),
                    1,
                    true,
                );
                let end = node.span().end;
                if let Some(from) = right.and_then(|right| self.after(right)).filter(|from| {
                    let token = self.token(*from);
                    token.is_word("from") && token.span.end <= end
                }) {
                    let source = self.after(from);
                    self.table
                        .set_offsets(std::iter::once(from).chain(source), 1, export);
                }
            }
            NodeData::ExportDefaultDeclaration { declaration } => {
                let export = self.first(id);
                let default = self.store.first_token_skip(id, 1);
                let declaration = self
                    .first_and_last_tokens(*declaration, 0)
                    .map(|(first, _)| first);
                self.table
                    .set_offsets(default.into_iter().chain(declaration), 1, export);
            }
            NodeData::ExportAllDeclaration { exported, .. } => {
                let mut tokens = self.store.tokens_of(id, &TokenQuery::CODE);
                if tokens.is_empty() {
                    return;
                }
                let export = tokens.remove(0);
                if tokens.last().is_some_and(|last| is_semicolon(self.token(*last))) {
                    tokens.pop();
                }
                let Some(exported) = exported else {
                    self.table.set_offsets(tokens, 1, Some(export));
                    return;
                };
                // export * as name from "mod"
                let star = tokens
                    .iter()
                    .copied()
                    .find(|token| self.token(*token).is_punct("*"));
                let as_token = star.and_then(|token| self.after(token));
                let exported_token = self.first(*exported);
                self.table.set_offset(star, 1, Some(export));
                self.table.set_offset(as_token, 1, star);
                self.table.set_offset(exported_token, 1, star);
                let rest = tokens
                    .into_iter()
                    .filter(|token| exported_token.is_some_and(|exported| *token > exported));
                self.table.set_offsets(rest, 1, Some(export));
            }
            _ => {}
        }
    }

    /// Items between the node's own first and last tokens
    fn process_delimited(&mut self, id: NodeId, items: &[Option<NodeId>], offset: u32) {
        let left = self.first(id);
        let right = self.last(id);
        self.process_node_list(
            items,
            left.map(Bound::Token),
            right.map(Bound::Token),
            offset,
            true,
        );
    }

    fn indent_second_token(&mut self, id: NodeId) {
        let first = self.first(id);
        let second = first.and_then(|token| self.after(token));
        self.table.set_offset(second, 1, first);
    }

    /// Statements of a script element. Statements of a top-level element
    /// are anchored at the script base indentation; nested ones are placed
    /// relative to the element's start tag. Comments between statements
    /// follow the next statement.
    fn process_program(&mut self, node: NodeRef<'a>, body: &[NodeId]) {
        let Some(element) = node.parent() else {
            return;
        };
        let top_level = element
            .parent()
            .is_some_and(|parent| parent.kind() == NodeKind::Document);
        let anchor = self.first(element.id);

        for statement in body {
            let first = self.first(*statement);
            self.place_statement(first, top_level, anchor);
        }

        let comments: Vec<TokenId> = self
            .store
            .tokens_of(node.id, &TokenQuery::WITH_COMMENTS)
            .into_iter()
            .filter(|token| {
                let token = self.token(*token);
                token.is_comment()
                    && !body
                        .iter()
                        .any(|statement| self.node(*statement).span().contains(token.span))
            })
            .collect();
        for comment in comments {
            let end = self.token(comment).span.end;
            let next = body
                .iter()
                .find(|statement| self.node(**statement).span().start >= end)
                .or(body.last())
                .and_then(|statement| self.first(*statement));
            match next {
                Some(next) => self.table.copy_entry(next, comment),
                None => self.place_statement(Some(comment), top_level, anchor),
            }
        }
    }

    fn place_statement(&mut self, token: Option<TokenId>, top_level: bool, anchor: Option<TokenId>) {
        let levels = self.settings.script_base_indent;
        if top_level {
            self.table
                .set_expected(token, levels * self.settings.indent_size);
        } else {
            self.table.set_offset(token, levels, anchor);
        }
    }

    fn process_arrow(&mut self, id: NodeId, params: &[NodeId], body: NodeId, is_async: bool) {
        let Some(first) = self.first(id) else {
            return;
        };
        let second = self.after(first);
        let left = if is_async { second } else { Some(first) };
        let arrow = self.before_node_where(body, is_arrow);

        if is_async {
            self.table.set_offset(second, 1, Some(first));
        }
        if let Some(left) = left.filter(|left| is_open_paren(self.token(*left))) {
            let right = self.closing_paren_of(left, params);
            self.process_node_list(
                &present(params),
                Some(Bound::Token(left)),
                right.map(Bound::Token),
                1,
                true,
            );
        }
        self.table.set_offset(arrow, 1, Some(first));
        self.process_maybe_block(body, Some(first));
    }

    /// The `)` closing a parameter list opened by `left`
    fn closing_paren_of(&self, left: TokenId, params: &[NodeId]) -> Option<TokenId> {
        match params.last() {
            Some(last) => self.after_node_where(*last, is_close_paren),
            None => self.after_where(left, is_close_paren),
        }
    }

    fn process_function(
        &mut self,
        node: NodeRef<'a>,
        name: Option<NodeId>,
        params: &[NodeId],
        body: NodeId,
        is_async: bool,
        generator: bool,
    ) {
        let Some(first) = self.first(node.id) else {
            return;
        };
        let body_token = self.first(body);

        if is_open_paren(self.token(first)) {
            // Method value: the function starts at its parameter list.
            let right = self.closing_paren_of(first, params);
            self.process_node_list(
                &present(params),
                Some(Bound::Token(first)),
                right.map(Bound::Token),
                1,
                true,
            );
            let owner = node.parent().and_then(|parent| self.first(parent.id));
            self.table.set_offset(body_token, 0, owner);
            return;
        }

        let function = if is_async { self.after(first) } else { Some(first) };
        let star = if generator {
            function.and_then(|token| self.after(token))
        } else {
            None
        };
        let name_token = name.and_then(|name| self.first(name));
        let left = name_token
            .or(star)
            .or(function)
            .and_then(|token| self.after(token));
        let right = left.and_then(|left| self.closing_paren_of(left, params));

        if is_async {
            self.table.set_offset(function, 0, Some(first));
        }
        if generator {
            self.table.set_offset(star, 1, Some(first));
        }
        self.table.set_offset(name_token, 1, Some(first));
        self.table.set_offset(left, 1, Some(first));
        self.process_node_list(
            &present(params),
            left.map(Bound::Token),
            right.map(Bound::Token),
            1,
            true,
        );
        self.table.set_offset(body_token, 0, Some(first));
    }

    fn process_for_in_of(&mut self, id: NodeId, left: NodeId, body: NodeId, is_await: bool) {
        let for_token = self.first(id);
        let await_token = if is_await {
            for_token.and_then(|token| self.after(token))
        } else {
            None
        };
        let left_paren = await_token
            .or(for_token)
            .and_then(|token| self.after(token));
        let left_token = left_paren.and_then(|token| self.after(token));
        let operator = self.after_node_where(left, is_not_close_paren);
        let right_token = operator.and_then(|token| self.after(token));
        let right_paren = self.before_node_where(body, is_not_open_paren);

        self.table.set_offset(await_token, 0, for_token);
        self.table.set_offset(left_paren, 1, for_token);
        self.table.set_offset(left_token, 1, left_paren);
        self.table.set_offset(operator, 1, left_token);
        self.table.set_offset(right_token, 1, left_token);
        self.table.set_offset(right_paren, 0, left_paren);
        self.process_maybe_block(body, for_token);
    }

    /// Operators of binary-like expressions indent one unit past the head
    /// of the operator chain, unless the head itself starts a line inside
    /// a construct that already indents it.
    fn process_binary_like(&mut self, node: NodeRef<'a>, left: NodeId) {
        let Some(head) = self.chain_head_token(node) else {
            return;
        };
        let operator = self.after_node_where(left, is_not_close_paren);
        let right = operator.and_then(|token| self.after(token));
        let head_line = self.token(head).loc.start.line;
        let should_indent = self
            .before(head)
            .map_or(true, |previous| self.token(previous).loc.end.line == head_line)
            || self.is_beginning_of_element(head, node);
        let offset = if should_indent { 1 } else { 0 };
        self.table
            .set_offsets(operator.into_iter().chain(right), offset, Some(head));
    }

    /// First token of the outermost same-kind ancestor not cut off by
    /// parentheses
    fn chain_head_token(&self, node: NodeRef<'a>) -> Option<TokenId> {
        let kind = node.kind();
        let mut current = node;
        while let Some(parent) = current.parent() {
            if parent.kind() != kind {
                break;
            }
            if self
                .before_node(current.id)
                .is_some_and(|token| is_open_paren(self.token(token)))
            {
                break;
            }
            current = parent;
        }
        self.first(current.id)
    }

    /// Whether `token` starts a statement, a mustache expression or an
    /// element of an argument list, array or sequence
    fn is_beginning_of_element(&self, token: TokenId, node: NodeRef<'a>) -> bool {
        let start = self.token(token).span.start;
        let starts_item = |item: NodeId, border: u32| {
            self.first_and_last_tokens(item, border)
                .is_some_and(|(first, _)| self.token(first).span.start == start)
        };

        let mut current = node;
        while let Some(parent) = current.parent() {
            let kind = parent.kind();
            if kind.is_statement() || kind.is_declaration() {
                return parent.span().start == start;
            }
            match parent.data() {
                NodeData::Mustache { .. } => {
                    if current.span().start != start {
                        return false;
                    }
                    return !self
                        .before_node(node.id)
                        .is_some_and(|previous| is_open_paren(self.token(previous)));
                }
                NodeData::CallExpression {
                    callee, arguments, ..
                }
                | NodeData::NewExpression {
                    callee, arguments, ..
                } => {
                    let border = self
                        .after_node_where(*callee, is_not_close_paren)
                        .map_or(parent.span().start, |open| self.token(open).span.end);
                    return arguments.iter().any(|argument| starts_item(*argument, border));
                }
                NodeData::ArrayExpression { elements } => {
                    let border = parent.span().start;
                    return elements
                        .iter()
                        .flatten()
                        .any(|element| starts_item(*element, border));
                }
                NodeData::SequenceExpression { expressions } => {
                    let border = parent.span().start;
                    return expressions
                        .iter()
                        .any(|expression| starts_item(*expression, border));
                }
                _ => {}
            }
            current = parent;
        }
        false
    }

    fn process_conditional(&mut self, node: NodeRef<'a>, test: NodeId, consequent: NodeId) {
        let first = self.first(node.id);
        let question = self.after_node_where(test, is_not_close_paren);
        let consequent_token = question.and_then(|token| self.after(token));
        let colon = self.after_node_where(consequent, is_not_close_paren);
        let alternate_token = colon.and_then(|token| self.after(token));

        let node_line = self.line_of(node.span().start);
        let flat = self
            .before_node(node.id)
            .is_some_and(|previous| self.token(previous).loc.end.line != node_line)
            && self.line_of(self.node(test).span().end)
                == self.line_of(self.node(consequent).span().start);

        if flat {
            let tokens = [question, consequent_token, colon, alternate_token];
            self.table.set_offsets(tokens.into_iter().flatten(), 0, first);
        } else {
            self.table
                .set_offsets(question.into_iter().chain(colon), 1, first);
            self.table.set_offsets(
                consequent_token.into_iter().chain(alternate_token),
                1,
                question,
            );
        }
    }

    /// Object properties, class methods and class fields
    fn process_member(&mut self, id: NodeId, key: NodeId, value: Option<NodeId>, computed: bool) {
        let Some(first) = self.first(id) else {
            return;
        };
        let Some((key_first, key_last)) = self.first_and_last_tokens(key, 0) else {
            return;
        };
        let mut prefix = self
            .store
            .tokens_between(first, key_first, &TokenQuery::CODE);
        if computed {
            prefix.pop();
        }
        self.table.set_offsets(prefix, 0, Some(first));

        let last_key = if computed {
            let left = self.before(key_first);
            let right = self.after(key_last);
            self.table.set_offset(left, 0, Some(first));
            self.process_node_list(
                &[Some(key)],
                left.map(Bound::Token),
                right.map(Bound::Token),
                1,
                true,
            );
            right
        } else {
            self.table.set_offset(Some(key_first), 0, Some(first));
            Some(key_last)
        };

        let (Some(last_key), Some(init)) = (last_key, value.and_then(|value| self.first(value)))
        else {
            return;
        };
        let mut tokens = self
            .store
            .tokens_between(last_key, init, &TokenQuery::CODE);
        tokens.push(init);
        self.table.set_offsets(tokens, 1, Some(last_key));
    }

    /// `import` clauses indent one unit; named specifiers form a list
    /// inside their braces.
    fn process_import(&mut self, id: NodeId, specifiers: &[NodeId]) {
        let mut tokens = self.store.tokens_of(id, &TokenQuery::CODE);
        if tokens.is_empty() {
            return;
        }
        let import = tokens.remove(0);
        if tokens.last().is_some_and(|last| is_semicolon(self.token(*last))) {
            tokens.pop();
        }

        let left = tokens
            .iter()
            .copied()
            .find(|token| is_open_brace(self.token(*token)));
        let right = tokens
            .iter()
            .copied()
            .rev()
            .find(|token| is_close_brace(self.token(*token)));
        self.table.set_offsets(tokens, 1, Some(import));

        if let Some(left) = left {
            let named: SmallVec<[Option<NodeId>; 8]> = specifiers
                .iter()
                .copied()
                .filter(|specifier| self.node(*specifier).kind() == NodeKind::ImportSpecifier)
                .map(Some)
                .collect();
            self.process_node_list(
                &named,
                Some(Bound::Token(left)),
                right.map(Bound::Token),
                1,
                true,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GessoConfig;
    use crate::linter::Linter;
    use crate::rule::RuleRegistry;
    use crate::rules::indent::Indent;

    fn lint_with(options: &str, source: &str) -> Vec<String> {
        let config = GessoConfig::from_json(&format!(r#"{{"rules": {{"mpx/indent": {options}}}}}"#))
            .unwrap();
        let rule = Indent::from_options(config.rules.indent.as_ref().unwrap()).unwrap();
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(rule));
        Linter::with_registry(registry)
            .lint(source, "test.wxml")
            .diagnostics
            .into_iter()
            .map(|diagnostic| diagnostic.message.to_string())
            .collect()
    }

    fn lint(source: &str) -> Vec<String> {
        lint_with("{}", source)
    }

    fn wxs(body: &str) -> String {
        format!("<wxs module=\"m\">\n{body}\n</wxs>")
    }

    #[test]
    fn test_function_body() {
        let source = wxs("function f(a) {\n  return a + 1\n}");
        assert!(lint(&source).is_empty());

        let source = wxs("function f(a) {\nreturn a + 1\n}");
        assert_eq!(
            lint(&source),
            ["Expected indentation of 2 spaces but found 0 spaces."]
        );
    }

    #[test]
    fn test_script_base_indent() {
        let source = wxs("  var a = 1\n  var b = 2");
        assert!(lint_with(r#"{"scriptBaseIndent": 1}"#, &source).is_empty());
        assert_eq!(lint(&source).len(), 2);
    }

    #[test]
    fn test_nested_script_statements_follow_start_tag() {
        let source = "<view>\n  <wxs module=\"m\">\n  var a = 1\n  </wxs>\n</view>";
        assert!(lint(source).is_empty());
    }

    #[test]
    fn test_object_and_array_literals() {
        let source = wxs("var o = {\n  a: 1,\n  b: [\n    1,\n    2\n  ]\n}");
        assert!(lint(&source).is_empty());
    }

    #[test]
    fn test_call_arguments() {
        let source = wxs("foo(\n  a,\n  b\n)");
        assert!(lint(&source).is_empty());

        let source = wxs("foo(a,\n    b)");
        assert!(lint(&source).is_empty());
    }

    #[test]
    fn test_binary_continuation() {
        let source = wxs("var a = b +\n  c");
        assert!(lint(&source).is_empty());
    }

    #[test]
    fn test_member_chain() {
        let source = wxs("foo\n  .bar()\n  .baz()");
        assert!(lint(&source).is_empty());
    }

    #[test]
    fn test_if_else() {
        let source = wxs("if (a) {\n  b()\n} else {\n  c()\n}");
        assert!(lint(&source).is_empty());

        let source = wxs("if (a)\n  b()\nelse\n  c()");
        assert!(lint(&source).is_empty());
    }

    #[test]
    fn test_switch_case_offset() {
        let source = wxs("switch (a) {\ncase 1:\n  b()\n  break\n}");
        assert!(lint(&source).is_empty());

        let source = wxs("switch (a) {\n  case 1:\n    b()\n}");
        assert!(lint_with(r#"{"switchCaseOffset": 1}"#, &source).is_empty());
    }

    #[test]
    fn test_comments_between_statements() {
        let source = wxs("// leading\nvar a = 1\n// between\nvar b = 2\n// trailing");
        assert!(lint(&source).is_empty());
    }

    #[test]
    fn test_decorator_lines_are_not_checked() {
        let source = wxs("class A {\n  @dec(\n        1,\n  2)\n  foo() {}\n}");
        assert!(lint(&source).is_empty());

        // The decorated member is still checked
        let source = wxs("class A {\n  @dec(\n        1,\n  2)\n      foo() {}\n}");
        assert_eq!(
            lint(&source),
            ["Expected indentation of 2 spaces but found 6 spaces."]
        );
    }

    #[test]
    fn test_mustache_expression_continuation() {
        let source = "<view>\n  {{ a ?\n    b :\n    c }}\n</view>";
        assert!(lint(source).is_empty());
    }
}
