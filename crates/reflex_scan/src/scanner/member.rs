//! Member declarations: fields, callables, fixed arrays, and the shared
//! type-expression reader they all start from.

use reflex_db::{Method, Modifiers, Property, TemplateParam, TraitList, TypeId};
use reflex_lexer::Token;

use super::{is_stop, Driver, MemberEnd};

/// A parsed type expression, before it is attached to a member.
struct ReadType {
    ty: TypeId,
    modifiers: Modifiers,
    template_parameters: Vec<TemplateParam>,
}

impl Driver<'_> {
    /// One member declaration, entered on its first token. `declaring` is
    /// the owning type, or `None` for the global markers.
    ///
    /// Markers are optional for data members but required for callables:
    /// an unmarked declaration that turns out to be a function is skipped
    /// whole, argument list and inline body included.
    pub(super) fn read_member(&mut self, declaring: Option<TypeId>) -> MemberEnd {
        // `NO_REFLECT` hides the next declaration, inline body included.
        if self.lexer.token() == Token::Ident && self.lexer.text() == "NO_REFLECT" {
            loop {
                let token = self.advance();
                if is_stop(token) || token.is_punct(b';') {
                    return MemberEnd::Synced;
                }
                if token.is_punct(b'{') {
                    let _ = self.lexer.eat_block(b'{', b'}');
                    return MemberEnd::Synced;
                }
            }
        }

        let mut allow_callables = false;
        let mut traits = TraitList::new();
        if self.lexer.token() == Token::Ident
            && matches!(self.lexer.text(), "PROPERTY" | "METHOD_CMD" | "REFLECT_GLOBAL")
        {
            allow_callables = true;
            traits = self.read_trait_list();
            if is_stop(self.lexer.token()) {
                return MemberEnd::Synced;
            }
            self.advance();
        }

        // `BITFIELD_FLAGS(Enum)` borrows bit names from a declared enum.
        let mut enum_flag_source = None;
        if self.lexer.token() == Token::Ident && self.lexer.text() == "BITFIELD_FLAGS" {
            self.advance();
            if self.advance() == Token::Ident {
                enum_flag_source = self.db.lookup(self.lexer.text());
                if enum_flag_source.is_none() {
                    tracing::debug!(name = %self.lexer.text(), "bit-name enum not declared");
                }
            }
            self.advance();
            self.advance();
        }

        // A bare block in member position is a constructor body whose
        // signature line was abandoned earlier; skip it balanced.
        if self.lexer.token().is_punct(b'{') {
            let _ = self.lexer.eat_block(b'{', b'}');
            return MemberEnd::Synced;
        }

        let Some(read) = self.read_type_information() else {
            // Nothing recognizable in type position: drop the line.
            self.lexer.eat_line();
            return MemberEnd::LineDropped;
        };

        if self.lexer.token() != Token::Ident {
            // Constructors and conversion operators have no name in member
            // position; abandon the line.
            self.lexer.eat_line();
            return MemberEnd::LineDropped;
        }
        let name = self.lexer.text().to_owned();

        let shape = self.advance();
        if shape.is_punct(b'(') {
            return self.read_callable(declaring, name, read, traits, allow_callables);
        }
        if shape.is_punct(b'[') {
            self.read_array_field(declaring, name, read, traits, enum_flag_source);
            return MemberEnd::NeedsSync;
        }
        self.finish_plain_field(declaring, name, read, traits, enum_flag_source);
        MemberEnd::Synced
    }

    /// Callable declaration, entered on the `(`.
    fn read_callable(
        &mut self,
        declaring: Option<TypeId>,
        name: String,
        read: ReadType,
        traits: TraitList,
        allow: bool,
    ) -> MemberEnd {
        if !allow {
            tracing::debug!(name = %name, "unmarked callable skipped");
            return self.skip_callable();
        }

        let return_type = Property {
            modifiers: read.modifiers.difference(Modifiers::VIRTUAL),
            template_parameters: read.template_parameters,
            ..Property::of(read.ty)
        };
        let mut method = Method::returning(return_type);
        method.name = name;
        method.declaring_type = declaring;
        method.binding_traits = traits;
        method.modifiers = read.modifiers.intersection(Modifiers::VIRTUAL);

        self.advance();
        loop {
            let token = self.lexer.token();
            if is_stop(token) || token.is_punct(b')') || token.is_punct(b';') {
                break;
            }
            if token != Token::Ident {
                self.advance();
                continue;
            }
            let Some(arg) = self.read_type_information() else {
                self.advance();
                continue;
            };
            method.arguments.push(Property {
                modifiers: arg.modifiers,
                template_parameters: arg.template_parameters,
                ..Property::of(arg.ty)
            });
            let mut arg_name = String::new();
            if self.lexer.token() == Token::Ident {
                arg_name = self.lexer.text().to_owned();
                self.advance();
            }
            method.argument_names.push(arg_name);
            if self.lexer.token().is_punct(b'=') {
                let text = self.capture_default_argument();
                // Defaults stay index-aligned even when earlier arguments
                // had none.
                method
                    .default_arguments
                    .resize(method.arguments.len() - 1, String::new());
                method.default_arguments.push(text);
            }
        }

        // Trailing qualifiers, one lookahead token each.
        loop {
            let flag = match self.lexer.peek_text().as_str() {
                "const" => Modifiers::CONST,
                "override" => Modifiers::OVERRIDE,
                "final" => Modifiers::FINAL,
                "abstract" => Modifiers::ABSTRACT,
                _ => break,
            };
            method.modifiers |= flag;
            self.advance();
        }

        method.pad_arguments();
        tracing::debug!(name = %method.name, arguments = method.arguments.len(), "captured callable");
        match declaring {
            Some(owner) => self.db.node_mut(owner).methods.push(method),
            None => self.db.global_functions.push(method),
        }

        // An inline body collapses to a statement boundary.
        if self.lexer.peek().is_punct(b'{') {
            self.advance();
            let _ = self.lexer.eat_block(b'{', b'}');
            return MemberEnd::Synced;
        }
        MemberEnd::NeedsSync
    }

    /// Balanced skip over an unmarked callable: argument list, trailing
    /// qualifiers, and inline body when present.
    fn skip_callable(&mut self) -> MemberEnd {
        let _ = self.lexer.eat_block(b'(', b')');
        while matches!(
            self.lexer.peek_text().as_str(),
            "const" | "override" | "final" | "abstract"
        ) {
            self.advance();
        }
        if self.lexer.peek().is_punct(b'{') {
            self.advance();
            let _ = self.lexer.eat_block(b'{', b'}');
            return MemberEnd::Synced;
        }
        MemberEnd::NeedsSync
    }

    /// `name[N]` fixed array; `N` is an integer literal or a declared enum
    /// constant.
    fn read_array_field(
        &mut self,
        declaring: Option<TypeId>,
        name: String,
        read: ReadType,
        traits: TraitList,
        enum_flag_source: Option<TypeId>,
    ) {
        let size = self.advance();
        let array_size = if size == Token::IntLit {
            u32::try_from(self.lexer.int_value()).unwrap_or(0)
        } else if size == Token::Ident {
            u32::try_from(self.db.find_enum_value(self.lexer.text())).unwrap_or(0)
        } else {
            0
        };
        let property = Property {
            name,
            modifiers: read.modifiers,
            template_parameters: read.template_parameters,
            enum_flag_source,
            binding_traits: traits,
            array_size,
            ..Property::of(read.ty)
        };
        tracing::debug!(name = %property.name, size = property.array_size, "captured array property");
        match declaring {
            Some(owner) => self.db.node_mut(owner).properties.push(property),
            None => self.db.global_properties.push(property),
        }
        if self.lexer.peek().is_punct(b']') {
            self.advance();
        }
    }

    /// Vanilla data member or global variable; the initializer tail, if
    /// any, is discarded by the resynchronization.
    fn finish_plain_field(
        &mut self,
        declaring: Option<TypeId>,
        name: String,
        read: ReadType,
        traits: TraitList,
        enum_flag_source: Option<TypeId>,
    ) {
        let property = Property {
            name,
            modifiers: read.modifiers,
            template_parameters: read.template_parameters,
            enum_flag_source,
            binding_traits: traits,
            ..Property::of(read.ty)
        };
        tracing::debug!(name = %property.name, "captured property");
        match declaring {
            Some(owner) => self.db.node_mut(owner).properties.push(property),
            None => self.db.global_properties.push(property),
        }
        self.resync_statement();
    }

    // === Type expressions ===

    /// Shared type-expression reader: leading modifier keywords in any
    /// order, builtin canonicalization, one level of `A::B`, a recursive
    /// template argument list, and a trailing `*` or `&`.
    ///
    /// Returns `None` when the token in type position is not an
    /// identifier. Otherwise the lexer is left on the token after the type
    /// expression, and unknown names have become stand-ins.
    fn read_type_information(&mut self) -> Option<ReadType> {
        if self.lexer.token() != Token::Ident {
            return None;
        }

        let mut modifiers = Modifiers::empty();
        loop {
            let recognized = match self.lexer.text() {
                "static" => Some(Modifiers::STATIC),
                "virtual" => Some(Modifiers::VIRTUAL),
                "transient" => Some(Modifiers::TRANSIENT),
                "const" => Some(Modifiers::CONST),
                "mutable" => Some(Modifiers::MUTABLE),
                "volatile" => Some(Modifiers::VOLATILE),
                // Recognized so the type name that follows still parses;
                // neither carries a modifier bit.
                "inline" | "explicit" => Some(Modifiers::empty()),
                _ => None,
            };
            let Some(flag) = recognized else {
                break;
            };
            modifiers |= flag;
            if self.advance() != Token::Ident {
                return None;
            }
        }

        let mut name = self.canonical_type_name();
        self.advance();

        // One level of namespacing: `A::B`.
        if self.lexer.token().is_punct(b':') && self.lexer.peek().is_punct(b':') {
            self.advance();
            if self.advance() == Token::Ident {
                name.push_str("::");
                name.push_str(self.lexer.text());
                self.advance();
            }
        }

        let mut template_parameters = Vec::new();
        if self.lexer.token().is_punct(b'<') {
            template_parameters = self.read_template_arguments();
            modifiers |= Modifiers::TEMPLATE;
        }

        if self.lexer.token().is_punct(b'*') {
            modifiers |= Modifiers::POINTER;
            self.advance();
        } else if self.lexer.token().is_punct(b'&') {
            modifiers |= Modifiers::REFERENCE;
            self.advance();
        }

        let ty = match self.db.lookup(&name) {
            Some(id) => id,
            None => self.db.add_standin(&name),
        };
        Some(ReadType {
            ty,
            modifiers,
            template_parameters,
        })
    }

    /// Current identifier as a type name, folding multi-word builtin
    /// spellings onto their fixed-width names. The extra words are
    /// consumed; single-token names pass through untouched.
    fn canonical_type_name(&mut self) -> String {
        if self.lexer.text() == "unsigned" {
            if self.lexer.peek_text() == "char" {
                self.advance();
                return "uint8_t".to_owned();
            }
            if self.lexer.peek_text() == "short" {
                self.advance();
                return "uint16_t".to_owned();
            }
            if self.lexer.peek_text() == "int" {
                self.advance();
                return "uint32_t".to_owned();
            }
            if self.lexer.peek_text() == "long" {
                self.advance();
                if self.lexer.peek_text() == "long" {
                    self.advance();
                    return "uint64_t".to_owned();
                }
                return "uint32_t".to_owned();
            }
            return "unsigned".to_owned();
        }
        if self.lexer.text() == "short" {
            return "int16_t".to_owned();
        }
        if self.lexer.text() == "long" {
            if self.lexer.peek_text() == "long" {
                self.advance();
            }
            return "int64_t".to_owned();
        }
        self.lexer.text().to_owned()
    }

    /// `<...>` template argument list. Entered on the `<`, exits past the
    /// matching closer; `>>` is split so nested lists close one level at a
    /// time.
    fn read_template_arguments(&mut self) -> Vec<TemplateParam> {
        let mut params = Vec::new();
        self.advance();
        loop {
            let token = self.lexer.token();
            if is_stop(token) || token.is_punct(b'>') {
                break;
            }
            if token == Token::ShiftRight {
                self.lexer.split_shift_right();
                break;
            }
            if token == Token::IntLit {
                params.push(TemplateParam::Integer(self.lexer.int_value()));
                self.advance();
                continue;
            }
            if token == Token::Ident {
                if let Some(nested) = self.read_type_information() {
                    params.push(TemplateParam::Nested(Property {
                        modifiers: nested.modifiers,
                        template_parameters: nested.template_parameters,
                        ..Property::of(nested.ty)
                    }));
                }
                continue;
            }
            self.advance();
        }
        if self.lexer.token().is_punct(b'>') {
            self.advance();
        }
        params
    }

    /// Verbatim default-argument text: the source span from the token
    /// after the `=` through the last token before the argument separator,
    /// nested parentheses kept balanced.
    fn capture_default_argument(&mut self) -> String {
        let mut depth = 0u32;
        let mut start = None;
        let mut end = 0;
        loop {
            let token = self.advance();
            if is_stop(token) {
                break;
            }
            if depth == 0 && (token.is_punct(b',') || token.is_punct(b')')) {
                break;
            }
            if token.is_punct(b'(') {
                depth += 1;
            } else if token.is_punct(b')') {
                depth = depth.saturating_sub(1);
            }
            if start.is_none() {
                start = Some(self.lexer.token_start());
            }
            end = self.lexer.token_end();
        }
        match start {
            Some(start) => self.src.get(start..end).unwrap_or_default().to_owned(),
            None => String::new(),
        }
    }
}
