//! In-memory translation units.
//!
//! [`MemoryTranslationUnit`] is an arena-backed [`ClangTranslationUnit`]:
//! cursors and types live in two vectors and handles are indices into them.
//! It serializes to JSON, so a parser front end can dump a unit once and the
//! explorer can replay it later without the parser present.
//!
//! [`MemoryTranslationUnitBuilder`] assembles units with natural C layout and
//! clang-style spellings.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clang::{
    CallingConv, ClangTranslationUnit, CursorKind, FileLocation, Linkage, TargetInfo, TypeKind,
    LAYOUT_INCOMPLETE, LAYOUT_INVALID,
};
use crate::error::{ExploreError, Result};

/// Index of a cursor in a [`MemoryTranslationUnit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CursorId(pub u32);

impl CursorId {
    /// The translation-unit cursor.
    pub const ROOT: CursorId = CursorId(0);
    /// The cursor returned by failed declaration lookups.
    pub const NO_DECL: CursorId = CursorId(1);
}

/// Index of a type in a [`MemoryTranslationUnit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The invalid type.
    pub const INVALID: TypeId = TypeId(0);
}

fn layout_invalid() -> i64 {
    LAYOUT_INVALID
}

/// A stored cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCursor {
    pub kind: CursorKind,
    #[serde(default)]
    pub spelling: String,
    #[serde(default, rename = "type")]
    pub ty: TypeId,
    #[serde(default)]
    pub linkage: Linkage,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub location: FileLocation,
    #[serde(default)]
    pub children: Vec<CursorId>,
    #[serde(default)]
    pub macro_builtin: bool,
    #[serde(default)]
    pub macro_function_like: bool,
    #[serde(default)]
    pub macro_tokens: Vec<String>,
    #[serde(default)]
    pub underlying_type: Option<TypeId>,
    #[serde(default = "layout_invalid")]
    pub field_offset_bits: i64,
    #[serde(default)]
    pub enum_value: i64,
    #[serde(default)]
    pub enum_integer_type: Option<TypeId>,
}

impl MemoryCursor {
    fn new(kind: CursorKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            ty: TypeId::INVALID,
            linkage: Linkage::NoLinkage,
            anonymous: false,
            location: FileLocation::default(),
            children: Vec::new(),
            macro_builtin: false,
            macro_function_like: false,
            macro_tokens: Vec::new(),
            underlying_type: None,
            field_offset_bits: LAYOUT_INVALID,
            enum_value: 0,
            enum_integer_type: None,
        }
    }
}

/// A stored type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryType {
    pub kind: TypeKind,
    #[serde(default)]
    pub spelling: String,
    #[serde(default)]
    pub declaration: Option<CursorId>,
    #[serde(default = "layout_invalid")]
    pub size_of: i64,
    #[serde(default = "layout_invalid")]
    pub align_of: i64,
    #[serde(default = "layout_invalid")]
    pub array_size: i64,
    #[serde(default)]
    pub pointee: Option<TypeId>,
    #[serde(default)]
    pub element: Option<TypeId>,
    #[serde(default)]
    pub modified: Option<TypeId>,
    #[serde(default)]
    pub named: Option<TypeId>,
    #[serde(default)]
    pub canonical: Option<TypeId>,
    #[serde(default)]
    pub result: Option<TypeId>,
    #[serde(default)]
    pub arguments: Vec<TypeId>,
    #[serde(default)]
    pub variadic: bool,
    #[serde(default)]
    pub calling_convention: CallingConv,
    #[serde(default)]
    pub fields: Vec<CursorId>,
}

impl MemoryType {
    fn new(kind: TypeKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            declaration: None,
            size_of: LAYOUT_INVALID,
            align_of: LAYOUT_INVALID,
            array_size: LAYOUT_INVALID,
            pointee: None,
            element: None,
            modified: None,
            named: None,
            canonical: None,
            result: None,
            arguments: Vec::new(),
            variadic: false,
            calling_convention: CallingConv::C,
            fields: Vec::new(),
        }
    }
}

/// An arena-backed translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTranslationUnit {
    pub file_path: String,
    pub target: TargetInfo,
    pub cursors: Vec<MemoryCursor>,
    pub types: Vec<MemoryType>,
}

impl MemoryTranslationUnit {
    /// Parse a unit dump and check that every handle it contains resolves.
    pub fn from_json(input: &str) -> Result<Self> {
        let unit: MemoryTranslationUnit = serde_json::from_str(input)?;
        unit.validate()?;
        Ok(unit)
    }

    /// Load a unit dump from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |detail: String| Err(ExploreError::InvalidUnit { detail });

        match self.cursors.first() {
            Some(c) if c.kind == CursorKind::TranslationUnit => {}
            _ => return invalid("cursor 0 must be the translation unit".into()),
        }
        match self.cursors.get(1) {
            Some(c) if c.kind == CursorKind::NoDeclFound => {}
            _ => return invalid("cursor 1 must be the no-declaration cursor".into()),
        }
        match self.types.first() {
            Some(t) if t.kind == TypeKind::Invalid => {}
            _ => return invalid("type 0 must be the invalid type".into()),
        }

        let cursor_count = self.cursors.len();
        let type_count = self.types.len();
        let cursor_ok = |id: &CursorId| (id.0 as usize) < cursor_count;
        let type_ok = |id: &TypeId| (id.0 as usize) < type_count;

        for (index, cursor) in self.cursors.iter().enumerate() {
            let types_ok = type_ok(&cursor.ty)
                && cursor.underlying_type.iter().all(type_ok)
                && cursor.enum_integer_type.iter().all(type_ok);
            if !types_ok || !cursor.children.iter().all(cursor_ok) {
                return invalid(format!("cursor {index} references an unknown handle"));
            }
        }

        for (index, ty) in self.types.iter().enumerate() {
            let optional = [
                ty.pointee,
                ty.element,
                ty.modified,
                ty.named,
                ty.canonical,
                ty.result,
            ];
            let types_ok =
                optional.iter().flatten().all(type_ok) && ty.arguments.iter().all(type_ok);
            let cursors_ok =
                ty.declaration.iter().all(cursor_ok) && ty.fields.iter().all(cursor_ok);
            if !types_ok || !cursors_ok {
                return invalid(format!("type {index} references an unknown handle"));
            }
        }

        if let Some(index) = self.first_type_cycle() {
            return invalid(format!("type {index} refers back to itself"));
        }

        Ok(())
    }

    /// First type caught in a cycle of the links that classification walks.
    /// Record fields and function arguments are not followed, since a record
    /// may hold a pointer to itself.
    fn first_type_cycle(&self) -> Option<usize> {
        let count = self.types.len();
        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut in_degree = vec![0usize; count];

        for (index, ty) in self.types.iter().enumerate() {
            let declared = ty.declaration.and_then(|c| self.cursors.get(c.0 as usize));
            let wrapped = [ty.pointee, ty.element, ty.modified, ty.named]
                .into_iter()
                .flatten()
                .map(|t| t.0 as usize);
            // A type may name itself as its own canonical form or declaration type.
            let resolved = [
                ty.canonical,
                declared.map(|c| c.ty),
                declared.and_then(|c| c.underlying_type),
            ]
            .into_iter()
            .flatten()
            .map(|t| t.0 as usize)
            .filter(|&t| t != index);

            for target in wrapped.chain(resolved) {
                edges[index].push(target);
                in_degree[target] += 1;
            }
        }

        let mut ready: Vec<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
        while let Some(index) = ready.pop() {
            for &target in &edges[index] {
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    ready.push(target);
                }
            }
        }
        (0..count).find(|&i| in_degree[i] > 0)
    }

    fn cursor(&self, id: CursorId) -> &MemoryCursor {
        &self.cursors[id.0 as usize]
    }

    fn ty(&self, id: TypeId) -> &MemoryType {
        &self.types[id.0 as usize]
    }
}

impl ClangTranslationUnit for MemoryTranslationUnit {
    type Cursor = CursorId;
    type Type = TypeId;

    fn spelling(&self) -> String {
        self.file_path.clone()
    }

    fn target_info(&self) -> Result<TargetInfo> {
        if self.target.triple.is_empty() || self.target.pointer_width == 0 {
            return Err(ExploreError::TargetInfo {
                detail: format!("translation unit '{}' has no target", self.file_path),
            });
        }
        Ok(self.target.clone())
    }

    fn root_cursor(&self) -> CursorId {
        CursorId::ROOT
    }

    fn children(
        &self,
        cursor: CursorId,
        filter: &mut dyn FnMut(CursorId) -> bool,
    ) -> Vec<CursorId> {
        self.cursor(cursor)
            .children
            .iter()
            .copied()
            .filter(|child| filter(*child))
            .collect()
    }

    fn cursor_kind(&self, cursor: CursorId) -> CursorKind {
        self.cursor(cursor).kind
    }

    fn cursor_spelling(&self, cursor: CursorId) -> String {
        self.cursor(cursor).spelling.clone()
    }

    fn cursor_type(&self, cursor: CursorId) -> TypeId {
        self.cursor(cursor).ty
    }

    fn cursor_linkage(&self, cursor: CursorId) -> Linkage {
        self.cursor(cursor).linkage
    }

    fn cursor_is_anonymous(&self, cursor: CursorId) -> bool {
        self.cursor(cursor).anonymous
    }

    fn cursor_location(&self, cursor: CursorId) -> FileLocation {
        self.cursor(cursor).location.clone()
    }

    fn is_macro_builtin(&self, cursor: CursorId) -> bool {
        self.cursor(cursor).macro_builtin
    }

    fn is_macro_function_like(&self, cursor: CursorId) -> bool {
        self.cursor(cursor).macro_function_like
    }

    fn macro_tokens(&self, cursor: CursorId) -> Vec<String> {
        self.cursor(cursor).macro_tokens.clone()
    }

    fn typedef_underlying_type(&self, cursor: CursorId) -> TypeId {
        self.cursor(cursor).underlying_type.unwrap_or(TypeId::INVALID)
    }

    fn field_offset_bits(&self, cursor: CursorId) -> i64 {
        self.cursor(cursor).field_offset_bits
    }

    fn enum_constant_value(&self, cursor: CursorId) -> i64 {
        self.cursor(cursor).enum_value
    }

    fn enum_integer_type(&self, cursor: CursorId) -> TypeId {
        self.cursor(cursor).enum_integer_type.unwrap_or(TypeId::INVALID)
    }

    fn type_kind(&self, ty: TypeId) -> TypeKind {
        self.ty(ty).kind
    }

    fn type_spelling(&self, ty: TypeId) -> String {
        self.ty(ty).spelling.clone()
    }

    fn type_declaration(&self, ty: TypeId) -> CursorId {
        self.ty(ty).declaration.unwrap_or(CursorId::NO_DECL)
    }

    fn canonical_type(&self, ty: TypeId) -> TypeId {
        self.ty(ty).canonical.unwrap_or(ty)
    }

    fn modified_type(&self, ty: TypeId) -> TypeId {
        self.ty(ty).modified.unwrap_or(TypeId::INVALID)
    }

    fn named_type(&self, ty: TypeId) -> TypeId {
        self.ty(ty).named.unwrap_or(TypeId::INVALID)
    }

    fn pointee_type(&self, ty: TypeId) -> TypeId {
        self.ty(ty).pointee.unwrap_or(TypeId::INVALID)
    }

    fn element_type(&self, ty: TypeId) -> TypeId {
        self.ty(ty).element.unwrap_or(TypeId::INVALID)
    }

    fn result_type(&self, ty: TypeId) -> TypeId {
        self.ty(ty).result.unwrap_or(TypeId::INVALID)
    }

    fn argument_types(&self, ty: TypeId) -> Vec<TypeId> {
        self.ty(ty).arguments.clone()
    }

    fn is_function_variadic(&self, ty: TypeId) -> bool {
        self.ty(ty).variadic
    }

    fn calling_convention(&self, ty: TypeId) -> CallingConv {
        self.ty(ty).calling_convention
    }

    fn record_fields(&self, ty: TypeId) -> Vec<CursorId> {
        self.ty(ty).fields.clone()
    }

    fn size_of(&self, ty: TypeId) -> i64 {
        self.ty(ty).size_of
    }

    fn align_of(&self, ty: TypeId) -> i64 {
        self.ty(ty).align_of
    }

    fn array_size(&self, ty: TypeId) -> i64 {
        self.ty(ty).array_size
    }
}

fn align_up(value: i64, align: i64) -> i64 {
    if align <= 1 {
        value
    } else {
        (value + align - 1) / align * align
    }
}

/// Builds [`MemoryTranslationUnit`]s declaration by declaration.
///
/// Each declaration gets the next line of the current file. Named records,
/// typedefs, enums, functions, variables and macros become children of the
/// translation-unit cursor in the order they are added.
#[derive(Debug)]
pub struct MemoryTranslationUnitBuilder {
    unit: MemoryTranslationUnit,
    file: String,
    line: u32,
    system: bool,
    primitives: HashMap<TypeKind, TypeId>,
    long_size: i64,
    pointer_size: i64,
}

impl MemoryTranslationUnitBuilder {
    pub fn new(file_path: impl Into<String>, triple: impl Into<String>, pointer_width: u32) -> Self {
        let file_path = file_path.into();
        let triple = triple.into();
        let pointer_size = i64::from(pointer_width / 8);
        let long_size = if triple.contains("windows") || pointer_size == 4 {
            4
        } else {
            8
        };

        let unit = MemoryTranslationUnit {
            file_path: file_path.clone(),
            target: TargetInfo {
                triple,
                pointer_width,
            },
            cursors: vec![
                MemoryCursor::new(CursorKind::TranslationUnit, file_path.clone()),
                MemoryCursor::new(CursorKind::NoDeclFound, ""),
            ],
            types: vec![MemoryType::new(TypeKind::Invalid, "")],
        };

        Self {
            unit,
            file: file_path,
            line: 0,
            system: false,
            primitives: HashMap::new(),
            long_size,
            pointer_size,
        }
    }

    /// Place subsequent declarations in `path`.
    pub fn in_file(&mut self, path: impl Into<String>) -> &mut Self {
        self.file = path.into();
        self.line = 0;
        self
    }

    /// Mark subsequent declarations as coming from a system header.
    pub fn system_header(&mut self, system: bool) -> &mut Self {
        self.system = system;
        self
    }

    pub fn build(self) -> MemoryTranslationUnit {
        self.unit
    }

    fn next_location(&mut self) -> FileLocation {
        self.line += 1;
        FileLocation {
            file: Some(self.file.clone()),
            line: self.line,
            column: 1,
            is_in_system_header: self.system,
        }
    }

    fn add_cursor(&mut self, cursor: MemoryCursor) -> CursorId {
        let id = CursorId(self.unit.cursors.len() as u32);
        self.unit.cursors.push(cursor);
        id
    }

    fn add_type(&mut self, ty: MemoryType) -> TypeId {
        let id = TypeId(self.unit.types.len() as u32);
        self.unit.types.push(ty);
        id
    }

    fn add_top_level(&mut self, cursor: CursorId) {
        self.unit.cursors[0].children.push(cursor);
    }

    fn type_ref(&self, id: TypeId) -> &MemoryType {
        &self.unit.types[id.0 as usize]
    }

    /// A built-in type. Returns the invalid type for non-primitive kinds.
    pub fn primitive(&mut self, kind: TypeKind) -> TypeId {
        if let Some(id) = self.primitives.get(&kind) {
            return *id;
        }
        let (spelling, size) = match kind {
            TypeKind::Void => ("void", LAYOUT_INCOMPLETE),
            TypeKind::Bool => ("_Bool", 1),
            TypeKind::CharS | TypeKind::CharU => ("char", 1),
            TypeKind::SChar => ("signed char", 1),
            TypeKind::UChar => ("unsigned char", 1),
            TypeKind::Short => ("short", 2),
            TypeKind::UShort => ("unsigned short", 2),
            TypeKind::Int => ("int", 4),
            TypeKind::UInt => ("unsigned int", 4),
            TypeKind::Long => ("long", self.long_size),
            TypeKind::ULong => ("unsigned long", self.long_size),
            TypeKind::LongLong => ("long long", 8),
            TypeKind::ULongLong => ("unsigned long long", 8),
            TypeKind::Int128 => ("__int128", 16),
            TypeKind::UInt128 => ("unsigned __int128", 16),
            TypeKind::WChar => ("wchar_t", 4),
            TypeKind::Char16 => ("char16_t", 2),
            TypeKind::Char32 => ("char32_t", 4),
            TypeKind::Half => ("__fp16", 2),
            TypeKind::Float16 => ("_Float16", 2),
            TypeKind::Float => ("float", 4),
            TypeKind::Double => ("double", 8),
            TypeKind::LongDouble => ("long double", 16),
            TypeKind::Float128 => ("__float128", 16),
            _ => return TypeId::INVALID,
        };
        let mut ty = MemoryType::new(kind, spelling);
        ty.size_of = size;
        ty.align_of = size;
        let id = self.add_type(ty);
        self.primitives.insert(kind, id);
        id
    }

    pub fn int(&mut self) -> TypeId {
        self.primitive(TypeKind::Int)
    }

    pub fn void(&mut self) -> TypeId {
        self.primitive(TypeKind::Void)
    }

    /// `const T`.
    pub fn const_qualified(&mut self, ty: TypeId) -> TypeId {
        let mut qualified = self.type_ref(ty).clone();
        qualified.spelling = format!("const {}", qualified.spelling);
        qualified.canonical = None;
        self.add_type(qualified)
    }

    /// `T *`, or `R (*)(A...)` when `T` is a function type.
    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        let target = self.type_ref(pointee);
        let spelling = if target.kind.is_function() {
            target.spelling.replacen(" (", " (*)(", 1)
        } else if target.spelling.ends_with('*') {
            format!("{}*", target.spelling)
        } else {
            format!("{} *", target.spelling)
        };
        let mut ty = MemoryType::new(TypeKind::Pointer, spelling);
        ty.size_of = self.pointer_size;
        ty.align_of = self.pointer_size;
        ty.pointee = Some(pointee);
        self.add_type(ty)
    }

    /// `T[count]`.
    pub fn constant_array(&mut self, element: TypeId, count: i64) -> TypeId {
        let target = self.type_ref(element);
        let element_size = target.size_of.max(0);
        let mut ty = MemoryType::new(
            TypeKind::ConstantArray,
            format!("{}[{}]", target.spelling, count),
        );
        ty.size_of = element_size * count;
        ty.align_of = target.align_of;
        ty.array_size = count;
        ty.element = Some(element);
        self.add_type(ty)
    }

    /// `T[]`.
    pub fn incomplete_array(&mut self, element: TypeId) -> TypeId {
        let target = self.type_ref(element);
        let mut ty = MemoryType::new(TypeKind::IncompleteArray, format!("{}[]", target.spelling));
        ty.size_of = LAYOUT_INCOMPLETE;
        ty.align_of = target.align_of;
        ty.element = Some(element);
        self.add_type(ty)
    }

    /// A prototyped function type with the default calling convention.
    pub fn function_proto(&mut self, result: TypeId, arguments: &[TypeId], variadic: bool) -> TypeId {
        self.function_proto_with(result, arguments, variadic, CallingConv::C)
    }

    /// A prototyped function type.
    pub fn function_proto_with(
        &mut self,
        result: TypeId,
        arguments: &[TypeId],
        variadic: bool,
        calling_convention: CallingConv,
    ) -> TypeId {
        let mut parts: Vec<String> = arguments
            .iter()
            .map(|a| self.type_ref(*a).spelling.clone())
            .collect();
        if variadic {
            parts.push("...".to_string());
        }
        if parts.is_empty() {
            parts.push("void".to_string());
        }
        let spelling = format!("{} ({})", self.type_ref(result).spelling, parts.join(", "));
        let mut ty = MemoryType::new(TypeKind::FunctionProto, spelling);
        ty.size_of = 1;
        ty.align_of = 4;
        ty.result = Some(result);
        ty.arguments = arguments.to_vec();
        ty.variadic = variadic;
        ty.calling_convention = calling_convention;
        self.add_type(ty)
    }

    /// An elaborated reference (`struct Foo`) to a tag type.
    pub fn elaborated(&mut self, named: TypeId) -> TypeId {
        let target = self.type_ref(named).clone();
        let mut ty = MemoryType::new(TypeKind::Elaborated, target.spelling);
        ty.declaration = target.declaration;
        ty.size_of = target.size_of;
        ty.align_of = target.align_of;
        ty.named = Some(named);
        ty.canonical = Some(target.canonical.unwrap_or(named));
        self.add_type(ty)
    }

    /// An attribute-carrying wrapper around `modified`.
    pub fn attributed(&mut self, modified: TypeId) -> TypeId {
        let target = self.type_ref(modified).clone();
        let mut ty = MemoryType::new(TypeKind::Attributed, target.spelling);
        ty.size_of = target.size_of;
        ty.align_of = target.align_of;
        ty.modified = Some(modified);
        ty.canonical = Some(target.canonical.unwrap_or(modified));
        self.add_type(ty)
    }

    /// A type the parser declines to detail; only its canonical form is known.
    pub fn unexposed(&mut self, canonical: TypeId) -> TypeId {
        let target = self.type_ref(canonical).clone();
        let mut ty = MemoryType::new(TypeKind::Unexposed, target.spelling);
        ty.size_of = target.size_of;
        ty.align_of = target.align_of;
        ty.canonical = Some(canonical);
        self.add_type(ty)
    }

    fn add_record(
        &mut self,
        cursor_kind: CursorKind,
        cursor_spelling: &str,
        type_spelling: Option<String>,
        anonymous: bool,
        fields: Option<&[(&str, TypeId)]>,
    ) -> TypeId {
        let location = self.next_location();
        let keyword = if cursor_kind == CursorKind::UnionDecl {
            "union"
        } else {
            "struct"
        };
        let file = location.file.clone().unwrap_or_default();
        let type_spelling = type_spelling.unwrap_or_else(|| {
            let marker = if anonymous { "anonymous" } else { "unnamed" };
            format!(
                "{keyword} ({marker} at {file}:{}:{})",
                location.line, location.column
            )
        });

        let mut cursor = MemoryCursor::new(cursor_kind, cursor_spelling);
        cursor.anonymous = anonymous;
        cursor.location = location;
        let record_cursor = self.add_cursor(cursor);

        let mut ty = MemoryType::new(TypeKind::Record, type_spelling);
        ty.declaration = Some(record_cursor);
        let record_type = self.add_type(ty);
        self.unit.cursors[record_cursor.0 as usize].ty = record_type;

        match fields {
            Some(fields) => self.define_record(record_type, fields),
            None => {
                let ty = &mut self.unit.types[record_type.0 as usize];
                ty.size_of = LAYOUT_INCOMPLETE;
                ty.align_of = LAYOUT_INCOMPLETE;
            }
        }
        record_type
    }

    /// Complete a forward-declared record, so that its fields may refer to
    /// pointers to the record itself.
    pub fn define_record(&mut self, record_type: TypeId, fields: &[(&str, TypeId)]) {
        let Some(record_cursor) = self.type_ref(record_type).declaration else {
            return;
        };
        let is_union = self.unit.cursors[record_cursor.0 as usize].kind == CursorKind::UnionDecl;
        let mut offset = 0i64;
        let mut size = 0i64;
        let mut max_align = 1i64;
        let mut field_cursors = Vec::with_capacity(fields.len());
        for (name, field_type) in fields {
            let target = self.type_ref(*field_type);
            let field_size = target.size_of.max(0);
            let field_align = target.align_of.max(1);
            let field_offset = if is_union { 0 } else { align_up(offset, field_align) };
            offset = field_offset + field_size;
            size = size.max(offset);
            max_align = max_align.max(field_align);

            let mut field = MemoryCursor::new(CursorKind::FieldDecl, *name);
            field.ty = *field_type;
            field.location = self.next_location();
            field.field_offset_bits = field_offset * 8;
            field_cursors.push(self.add_cursor(field));
        }

        self.unit.cursors[record_cursor.0 as usize].children = field_cursors.clone();
        let ty = &mut self.unit.types[record_type.0 as usize];
        ty.size_of = align_up(size, max_align);
        ty.align_of = max_align;
        ty.fields = field_cursors;
    }

    fn add_named_record(
        &mut self,
        cursor_kind: CursorKind,
        name: &str,
        fields: Option<&[(&str, TypeId)]>,
    ) -> TypeId {
        let keyword = if cursor_kind == CursorKind::UnionDecl {
            "union"
        } else {
            "struct"
        };
        let ty = self.add_record(
            cursor_kind,
            name,
            Some(format!("{keyword} {name}")),
            false,
            fields,
        );
        let cursor = self.type_ref(ty).declaration.unwrap_or(CursorId::NO_DECL);
        self.add_top_level(cursor);
        ty
    }

    /// `struct name { fields }`.
    pub fn struct_type(&mut self, name: &str, fields: &[(&str, TypeId)]) -> TypeId {
        self.add_named_record(CursorKind::StructDecl, name, Some(fields))
    }

    /// `union name { fields }`.
    pub fn union_type(&mut self, name: &str, fields: &[(&str, TypeId)]) -> TypeId {
        self.add_named_record(CursorKind::UnionDecl, name, Some(fields))
    }

    /// `struct name;` with no definition.
    pub fn forward_struct(&mut self, name: &str) -> TypeId {
        self.add_named_record(CursorKind::StructDecl, name, None)
    }

    /// `union name;` with no definition.
    pub fn forward_union(&mut self, name: &str) -> TypeId {
        self.add_named_record(CursorKind::UnionDecl, name, None)
    }

    /// An anonymous struct member: `struct { fields };` inside a record.
    pub fn anonymous_struct(&mut self, fields: &[(&str, TypeId)]) -> TypeId {
        self.add_record(CursorKind::StructDecl, "", None, true, Some(fields))
    }

    /// An anonymous union member: `union { fields };` inside a record.
    pub fn anonymous_union(&mut self, fields: &[(&str, TypeId)]) -> TypeId {
        self.add_record(CursorKind::UnionDecl, "", None, true, Some(fields))
    }

    /// An unnamed struct used as the type of a named field: `struct { .. } f;`.
    pub fn unnamed_struct(&mut self, fields: &[(&str, TypeId)]) -> TypeId {
        self.add_record(CursorKind::StructDecl, "", None, false, Some(fields))
    }

    /// `typedef struct { fields } name;`, returning the typedef type.
    pub fn typedef_struct(&mut self, name: &str, fields: &[(&str, TypeId)]) -> TypeId {
        let record = self.add_record(
            CursorKind::StructDecl,
            "",
            Some(name.to_string()),
            false,
            Some(fields),
        );
        let elaborated = self.elaborated(record);
        self.typedef(name, elaborated)
    }

    /// `typedef underlying name;`.
    pub fn typedef(&mut self, name: &str, underlying: TypeId) -> TypeId {
        let location = self.next_location();
        let target = self.type_ref(underlying).clone();

        let mut cursor = MemoryCursor::new(CursorKind::TypedefDecl, name);
        cursor.location = location;
        cursor.underlying_type = Some(underlying);
        let typedef_cursor = self.add_cursor(cursor);

        let mut ty = MemoryType::new(TypeKind::Typedef, name);
        ty.declaration = Some(typedef_cursor);
        ty.size_of = target.size_of;
        ty.align_of = target.align_of;
        ty.canonical = Some(target.canonical.unwrap_or(underlying));
        let typedef_type = self.add_type(ty);

        self.unit.cursors[typedef_cursor.0 as usize].ty = typedef_type;
        self.add_top_level(typedef_cursor);
        typedef_type
    }

    fn add_enum(
        &mut self,
        cursor_spelling: &str,
        type_spelling: Option<String>,
        anonymous: bool,
        values: &[(&str, i64)],
    ) -> TypeId {
        let location = self.next_location();
        let file = location.file.clone().unwrap_or_default();
        let type_spelling = type_spelling.unwrap_or_else(|| {
            format!(
                "enum (anonymous at {file}:{}:{})",
                location.line, location.column
            )
        });
        let integer_kind = if values.iter().any(|(_, v)| *v < 0) {
            TypeKind::Int
        } else {
            TypeKind::UInt
        };
        let integer_type = self.primitive(integer_kind);

        let mut cursor = MemoryCursor::new(CursorKind::EnumDecl, cursor_spelling);
        cursor.anonymous = anonymous;
        cursor.location = location;
        cursor.linkage = Linkage::External;
        cursor.enum_integer_type = Some(integer_type);
        let enum_cursor = self.add_cursor(cursor);

        let mut ty = MemoryType::new(TypeKind::Enum, type_spelling);
        ty.declaration = Some(enum_cursor);
        ty.size_of = 4;
        ty.align_of = 4;
        let enum_type = self.add_type(ty);
        self.unit.cursors[enum_cursor.0 as usize].ty = enum_type;

        let mut constants = Vec::with_capacity(values.len());
        for (constant_name, value) in values {
            let mut constant = MemoryCursor::new(CursorKind::EnumConstantDecl, *constant_name);
            constant.ty = enum_type;
            constant.location = self.next_location();
            constant.enum_value = *value;
            constants.push(self.add_cursor(constant));
        }
        self.unit.cursors[enum_cursor.0 as usize].children = constants;
        enum_type
    }

    /// `enum name { values }`. The integer type is `unsigned int` unless a
    /// value is negative.
    pub fn enum_type(&mut self, name: &str, values: &[(&str, i64)]) -> TypeId {
        let enum_type = self.add_enum(name, Some(format!("enum {name}")), false, values);
        let cursor = self.type_ref(enum_type).declaration.unwrap_or(CursorId::NO_DECL);
        self.add_top_level(cursor);
        enum_type
    }

    /// An anonymous enum used as the type of a field: `enum { values } f;`.
    pub fn anonymous_enum(&mut self, values: &[(&str, i64)]) -> TypeId {
        self.add_enum("", None, true, values)
    }

    /// A file-scope `enum { values };` with no tag.
    pub fn top_level_anonymous_enum(&mut self, values: &[(&str, i64)]) -> TypeId {
        let enum_type = self.add_enum("", None, true, values);
        let cursor = self.type_ref(enum_type).declaration.unwrap_or(CursorId::NO_DECL);
        self.add_top_level(cursor);
        enum_type
    }

    fn add_function(
        &mut self,
        name: &str,
        function_type: TypeId,
        parameter_names: &[&str],
        linkage: Linkage,
    ) -> CursorId {
        let location = self.next_location();
        let arguments = self.type_ref(function_type).arguments.clone();

        let mut parameters = Vec::with_capacity(arguments.len());
        for (index, argument) in arguments.iter().enumerate() {
            let parameter_name = parameter_names.get(index).copied().unwrap_or_default();
            let mut parameter = MemoryCursor::new(CursorKind::ParmDecl, parameter_name);
            parameter.ty = *argument;
            parameter.location = location.clone();
            parameters.push(self.add_cursor(parameter));
        }

        let mut cursor = MemoryCursor::new(CursorKind::FunctionDecl, name);
        cursor.ty = function_type;
        cursor.linkage = linkage;
        cursor.location = location;
        cursor.children = parameters;
        let function = self.add_cursor(cursor);
        self.add_top_level(function);
        function
    }

    /// An externally linked function declaration.
    pub fn function(&mut self, name: &str, result: TypeId, parameters: &[(&str, TypeId)]) -> CursorId {
        let arguments: Vec<TypeId> = parameters.iter().map(|(_, ty)| *ty).collect();
        let names: Vec<&str> = parameters.iter().map(|(n, _)| *n).collect();
        let function_type = self.function_proto(result, &arguments, false);
        self.add_function(name, function_type, &names, Linkage::External)
    }

    /// An externally linked function declaration with an explicit type.
    pub fn function_of_type(
        &mut self,
        name: &str,
        function_type: TypeId,
        parameter_names: &[&str],
    ) -> CursorId {
        self.add_function(name, function_type, parameter_names, Linkage::External)
    }

    /// An externally linked variadic function declaration.
    pub fn variadic_function(
        &mut self,
        name: &str,
        result: TypeId,
        parameters: &[(&str, TypeId)],
    ) -> CursorId {
        let arguments: Vec<TypeId> = parameters.iter().map(|(_, ty)| *ty).collect();
        let names: Vec<&str> = parameters.iter().map(|(n, _)| *n).collect();
        let function_type = self.function_proto(result, &arguments, true);
        self.add_function(name, function_type, &names, Linkage::External)
    }

    /// A `static` function declaration.
    pub fn static_function(&mut self, name: &str, result: TypeId) -> CursorId {
        let function_type = self.function_proto(result, &[], false);
        self.add_function(name, function_type, &[], Linkage::Internal)
    }

    fn add_variable(&mut self, name: &str, ty: TypeId, linkage: Linkage) -> CursorId {
        let mut cursor = MemoryCursor::new(CursorKind::VarDecl, name);
        cursor.ty = ty;
        cursor.linkage = linkage;
        cursor.location = self.next_location();
        let variable = self.add_cursor(cursor);
        self.add_top_level(variable);
        variable
    }

    /// An `extern` global variable.
    pub fn variable(&mut self, name: &str, ty: TypeId) -> CursorId {
        self.add_variable(name, ty, Linkage::External)
    }

    /// A `static` global variable.
    pub fn static_variable(&mut self, name: &str, ty: TypeId) -> CursorId {
        self.add_variable(name, ty, Linkage::Internal)
    }

    fn add_macro(&mut self, name: &str, tokens: &[&str], function_like: bool, builtin: bool) -> CursorId {
        let mut cursor = MemoryCursor::new(CursorKind::MacroDefinition, name);
        cursor.macro_tokens = tokens.iter().map(|t| t.to_string()).collect();
        cursor.macro_function_like = function_like;
        cursor.macro_builtin = builtin;
        cursor.location = if builtin {
            FileLocation::default()
        } else {
            self.next_location()
        };
        let definition = self.add_cursor(cursor);
        self.add_top_level(definition);
        definition
    }

    /// `#define name tokens...`.
    pub fn macro_object(&mut self, name: &str, tokens: &[&str]) -> CursorId {
        self.add_macro(name, tokens, false, false)
    }

    /// `#define name(args) tokens...`.
    pub fn function_like_macro(&mut self, name: &str, tokens: &[&str]) -> CursorId {
        self.add_macro(name, tokens, true, false)
    }

    /// A macro predefined by the compiler.
    pub fn builtin_macro(&mut self, name: &str, tokens: &[&str]) -> CursorId {
        self.add_macro(name, tokens, false, true)
    }

    /// A macro defined on the command line: no backing file, not built in.
    pub fn command_line_macro(&mut self, name: &str, tokens: &[&str]) -> CursorId {
        let definition = self.add_macro(name, tokens, false, false);
        let line = self.line;
        let cursor = &mut self.unit.cursors[definition.0 as usize];
        cursor.location = FileLocation {
            file: None,
            line,
            column: 9,
            is_in_system_header: false,
        };
        definition
    }
}
