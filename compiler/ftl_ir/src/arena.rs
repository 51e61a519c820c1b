//! Flat storage for a template's expression and element trees.

use crate::element::{Arg, Assignment, Element, IfArm, MacroParam, SwitchCase};
use crate::expr::{Expr, HashEntry, StrPart};
use crate::{
    ArgRange, AssignRange, CaseRange, ElementId, ElementRange, ExprId, ExprRange,
    HashEntryRange, IfArmRange, Name, NameRange, ParamRange, StrPartRange,
};

/// Convert a table length to a `u32` index.
///
/// # Panics
/// Panics past `u32::MAX` entries. Every node consumes at least one byte of
/// source and sources are capped at `u32::MAX` bytes.
fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: exceeds u32::MAX"))
}

fn push_list<T: Copy>(table: &mut Vec<T>, items: &[T], what: &str) -> (u32, u32) {
    if items.is_empty() {
        return (0, 0);
    }
    let start = to_u32(table.len(), what);
    table.extend_from_slice(items);
    (start, to_u32(items.len(), what))
}

/// Arena for both trees of one template.
///
/// # Index Spaces
///
/// - `exprs`: indexed by [`ExprId`]
/// - `elements`: indexed by [`ElementId`]
/// - one side table per list type, indexed by its range type
#[derive(Clone, Debug, Default)]
pub struct Ast {
    exprs: Vec<Expr>,
    elements: Vec<Element>,
    expr_lists: Vec<ExprId>,
    element_lists: Vec<ElementId>,
    str_parts: Vec<StrPart>,
    hash_entries: Vec<HashEntry>,
    if_arms: Vec<IfArm>,
    cases: Vec<SwitchCase>,
    params: Vec<MacroParam>,
    args: Vec<Arg>,
    assignments: Vec<Assignment>,
    names: Vec<Name>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate based on source length (roughly one node per 16 bytes).
    pub fn with_capacity(source_len: usize) -> Self {
        let estimated = source_len / 16;
        Ast {
            exprs: Vec::with_capacity(estimated),
            elements: Vec::with_capacity(estimated / 2),
            expr_lists: Vec::with_capacity(estimated / 4),
            element_lists: Vec::with_capacity(estimated / 2),
            ..Self::default()
        }
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expressions"));
        self.exprs.push(expr);
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn alloc_element(&mut self, element: Element) -> ElementId {
        let id = ElementId::new(to_u32(self.elements.len(), "elements"));
        self.elements.push(element);
        id
    }

    #[inline]
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }

    /// Replace an element allocated earlier (used to patch block bodies in
    /// after their children are parsed).
    pub fn set_element(&mut self, id: ElementId, element: Element) {
        self.elements[id.index()] = element;
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn push_exprs(&mut self, ids: &[ExprId]) -> ExprRange {
        let (start, len) = push_list(&mut self.expr_lists, ids, "expression lists");
        ExprRange::new(start, len)
    }

    pub fn exprs(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.to_range()]
    }

    pub fn push_elements(&mut self, ids: &[ElementId]) -> ElementRange {
        let (start, len) = push_list(&mut self.element_lists, ids, "element lists");
        ElementRange::new(start, len)
    }

    pub fn elements(&self, range: ElementRange) -> &[ElementId] {
        &self.element_lists[range.to_range()]
    }

    pub fn push_str_parts(&mut self, parts: &[StrPart]) -> StrPartRange {
        let (start, len) = push_list(&mut self.str_parts, parts, "string parts");
        StrPartRange::new(start, len)
    }

    pub fn str_parts(&self, range: StrPartRange) -> &[StrPart] {
        &self.str_parts[range.to_range()]
    }

    pub fn push_hash_entries(&mut self, entries: &[HashEntry]) -> HashEntryRange {
        let (start, len) = push_list(&mut self.hash_entries, entries, "hash entries");
        HashEntryRange::new(start, len)
    }

    pub fn hash_entries(&self, range: HashEntryRange) -> &[HashEntry] {
        &self.hash_entries[range.to_range()]
    }

    pub fn push_if_arms(&mut self, arms: &[IfArm]) -> IfArmRange {
        let (start, len) = push_list(&mut self.if_arms, arms, "if arms");
        IfArmRange::new(start, len)
    }

    pub fn if_arms(&self, range: IfArmRange) -> &[IfArm] {
        &self.if_arms[range.to_range()]
    }

    pub fn push_cases(&mut self, cases: &[SwitchCase]) -> CaseRange {
        let (start, len) = push_list(&mut self.cases, cases, "switch cases");
        CaseRange::new(start, len)
    }

    pub fn cases(&self, range: CaseRange) -> &[SwitchCase] {
        &self.cases[range.to_range()]
    }

    pub fn push_params(&mut self, params: &[MacroParam]) -> ParamRange {
        let (start, len) = push_list(&mut self.params, params, "macro parameters");
        ParamRange::new(start, len)
    }

    pub fn params(&self, range: ParamRange) -> &[MacroParam] {
        &self.params[range.to_range()]
    }

    pub fn push_args(&mut self, args: &[Arg]) -> ArgRange {
        let (start, len) = push_list(&mut self.args, args, "arguments");
        ArgRange::new(start, len)
    }

    pub fn args(&self, range: ArgRange) -> &[Arg] {
        &self.args[range.to_range()]
    }

    pub fn push_assignments(&mut self, assignments: &[Assignment]) -> AssignRange {
        let (start, len) = push_list(&mut self.assignments, assignments, "assignments");
        AssignRange::new(start, len)
    }

    pub fn assignments(&self, range: AssignRange) -> &[Assignment] {
        &self.assignments[range.to_range()]
    }

    pub fn push_names(&mut self, names: &[Name]) -> NameRange {
        let (start, len) = push_list(&mut self.names, names, "names");
        NameRange::new(start, len)
    }

    pub fn names(&self, range: NameRange) -> &[Name] {
        &self.names[range.to_range()]
    }
}
