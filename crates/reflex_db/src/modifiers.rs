//! Declaration modifier bits recorded on scanned properties and methods.
//!
//! The scanner folds C-family keywords (`static`, `const`, `virtual`, ...)
//! and trailing `*`/`&` marks into one compact set, so downstream
//! consumers can answer "is this a pointer" without re-reading source text.

use bitflags::bitflags;

bitflags! {
    /// Modifier keywords and type marks attached to a declaration.
    ///
    /// One declaration can carry several at once (`static const Node* x`),
    /// so these are bits rather than an enum.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Modifiers: u32 {
        // === Access (bits 0-3) ===

        /// Declared in (or after) a `public:` region.
        const PUBLIC = 1 << 0;
        /// Declared in a `protected:` region.
        const PROTECTED = 1 << 1;
        /// Declared in a `private:` region.
        const PRIVATE = 1 << 2;
        /// Visible to the declaring module only.
        const INTERNAL = 1 << 3;

        // === Dispatch and inheritance (bits 4-7) ===

        /// `abstract` (or a pure-virtual declaration).
        const ABSTRACT = 1 << 4;
        /// `virtual` member function.
        const VIRTUAL = 1 << 5;
        /// `override` on a member function.
        const OVERRIDE = 1 << 6;
        /// `final` on a type or member function.
        const FINAL = 1 << 7;

        // === Storage (bits 8-12) ===

        /// `static` storage.
        const STATIC = 1 << 8;
        /// `const` qualification.
        const CONST = 1 << 9;
        /// `mutable` field.
        const MUTABLE = 1 << 10;
        /// `volatile` qualification.
        const VOLATILE = 1 << 11;
        /// `transient` marker: excluded from serialization.
        const TRANSIENT = 1 << 12;

        // === Declaration shape (bits 13-15) ===

        /// Trailing `*` on the declared type.
        const POINTER = 1 << 13;
        /// Trailing `&` on the declared type.
        const REFERENCE = 1 << 14;
        /// The declared type takes template arguments.
        const TEMPLATE = 1 << 15;
    }
}

impl Modifiers {
    /// Check for `const` qualification.
    #[inline]
    pub const fn is_const(self) -> bool {
        self.contains(Self::CONST)
    }

    /// Check whether the declared type is a pointer.
    #[inline]
    pub const fn is_pointer(self) -> bool {
        self.contains(Self::POINTER)
    }

    /// Check whether the declared type is a reference.
    #[inline]
    pub const fn is_reference(self) -> bool {
        self.contains(Self::REFERENCE)
    }

    /// Check for `virtual` dispatch.
    #[inline]
    pub const fn is_virtual(self) -> bool {
        self.contains(Self::VIRTUAL)
    }

    /// Check for `static` storage.
    #[inline]
    pub const fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::empty()
    }
}
