//! Compiled fragments: the executable form a definition bakes into.
//!
//! Handlers turn definition nodes into fragments at compile time; a
//! render is one walk over the fragment tree against a scope. Every
//! expression a fragment owns is evaluated exactly once per render of
//! that fragment.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::RenderError;
use crate::escape::escape_markup;
use crate::expression_parser::CompiledExpr;
use crate::template::scope::Scope;
use crate::template::Template;
use crate::value::{self, Value};

/// One compiled piece of output.
#[derive(Debug, Clone)]
pub enum Fragment {
    /// Compiles from nothing, renders nothing.
    Empty,
    Literal(String),
    Sequence(SequenceFragment),
    Expr(ExprFragment),
    Element(Box<ElementFragment>),
    OmitEmptyAttr(Box<OmitEmptyAttrFragment>),
    Conditional(Box<ConditionalFragment>),
    Iteration(Box<IterationFragment>),
    SlotRef(SlotRefFragment),
    Use(Box<UseFragment>),
}

/// Items joined by a separator. An item that renders empty contributes
/// no separator on either side.
#[derive(Debug, Clone)]
pub struct SequenceFragment {
    pub items: Vec<Fragment>,
    pub separator: String,
}

#[derive(Debug, Clone)]
pub struct ExprFragment {
    pub expr: CompiledExpr,
    pub escape: bool,
}

#[derive(Debug, Clone)]
pub struct ElementFragment {
    pub tag: String,
    /// Attribute pieces emitted directly after `<tag`.
    pub attrs: Vec<Fragment>,
    pub content: Option<Fragment>,
    /// When present, the element is gated on its content: the probe
    /// runs once and the whole element is suppressed when it comes up
    /// empty. `content` is unset in that case; the probe owns it.
    pub gate: Option<GatedContent>,
    pub close_tag: bool,
}

/// Evaluate-once content gate for an omit-empty element.
#[derive(Debug, Clone)]
pub struct GatedContent {
    /// Binding name holding the probed value.
    pub temp: String,
    pub value: ValueProbe,
}

/// An attribute that is omitted entirely when its value probes empty.
#[derive(Debug, Clone)]
pub struct OmitEmptyAttrFragment {
    pub name: String,
    /// Binding name holding the probed value.
    pub temp: String,
    pub value: ValueProbe,
}

/// An omit-empty probe: decides emptiness and yields the emitted text
/// from the same single evaluation.
#[derive(Debug, Clone)]
pub enum ValueProbe {
    /// Lone expression value: truthiness of the raw value.
    Expr { expr: CompiledExpr, escape: bool },
    /// Lone slot value: non-emptiness of the bound string.
    Slot { name: String, escape: bool },
    /// Anything else: non-emptiness of the rendered string.
    Rendered(Fragment),
}

impl ValueProbe {
    /// `None` when the value probes empty; otherwise the text to emit,
    /// with the site's escape already applied.
    pub(crate) fn probe(&self, scope: &mut Scope<'_>) -> Result<Option<String>, RenderError> {
        match self {
            ValueProbe::Expr { expr, escape } => {
                let value = expr.evaluate(scope)?;
                if !value.is_truthy() {
                    return Ok(None);
                }
                let text = value.to_output_string();
                Ok(Some(if *escape { escape_markup(&text) } else { text }))
            }
            ValueProbe::Slot { name, escape } => {
                let bound = scope
                    .lookup_slot(name)
                    .ok_or_else(|| RenderError::UnsetSlot(name.clone()))?;
                if bound.is_empty() {
                    return Ok(None);
                }
                Ok(Some(if *escape {
                    escape_markup(bound)
                } else {
                    bound.to_string()
                }))
            }
            ValueProbe::Rendered(fragment) => {
                let rendered = fragment.render(scope)?;
                Ok(if rendered.is_empty() {
                    None
                } else {
                    Some(rendered)
                })
            }
        }
    }

    fn outline(&self, out: &mut String, pad: &str, depth: usize) {
        match self {
            ValueProbe::Expr { expr, escape } => {
                out.push_str(&format!(
                    "{pad}probe expr [{}] escape={escape}\n",
                    expr.source()
                ));
            }
            ValueProbe::Slot { name, escape } => {
                out.push_str(&format!("{pad}probe slot {{{name}}} escape={escape}\n"));
            }
            ValueProbe::Rendered(fragment) => {
                out.push_str(&format!("{pad}probe rendered:\n"));
                fragment.outline(out, depth + 1);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConditionalFragment {
    /// Binding name holding the evaluated test value.
    pub temp: String,
    pub test: CompiledExpr,
    pub mode: ConditionalMode,
}

#[derive(Debug, Clone)]
pub enum ConditionalMode {
    /// `yes` / `no` on truthiness.
    Truth {
        yes: Option<Fragment>,
        no: Option<Fragment>,
    },
    /// `empty` / `notEmpty` on sequence length; non-sequences render
    /// nothing.
    Emptiness {
        empty: Option<Fragment>,
        not_empty: Option<Fragment>,
    },
    /// `plural` / `singular` / `none` on a count; sequences count by
    /// length.
    Count {
        plural: Option<Fragment>,
        singular: Option<Fragment>,
        none: Option<Fragment>,
    },
}

#[derive(Debug, Clone)]
pub struct IterationFragment {
    pub each: CompiledExpr,
    pub filter: Option<CompiledExpr>,
    pub first: Option<Fragment>,
    pub content: Option<Fragment>,
    pub last: Option<Fragment>,
    pub item_var: String,
    pub index_var: String,
}

#[derive(Debug, Clone)]
pub struct SlotRefFragment {
    pub name: String,
    pub escape: bool,
}

#[derive(Debug, Clone)]
pub struct UseFragment {
    pub template: Arc<Template>,
    /// Binding fragments in the target's declaration order.
    pub bindings: Vec<(String, Fragment)>,
}

impl Fragment {
    /// Concatenation without separators.
    pub fn concat(items: Vec<Fragment>) -> Fragment {
        Fragment::Sequence(SequenceFragment {
            items,
            separator: String::new(),
        })
    }

    pub(crate) fn render(&self, scope: &mut Scope<'_>) -> Result<String, RenderError> {
        match self {
            Fragment::Empty => Ok(String::new()),
            Fragment::Literal(text) => Ok(text.clone()),
            Fragment::Sequence(sequence) => sequence.render(scope),
            Fragment::Expr(expr) => expr.render(scope),
            Fragment::Element(element) => element.render(scope),
            Fragment::OmitEmptyAttr(attr) => attr.render(scope),
            Fragment::Conditional(conditional) => conditional.render(scope),
            Fragment::Iteration(iteration) => iteration.render(scope),
            Fragment::SlotRef(slot) => slot.render(scope),
            Fragment::Use(composed) => composed.render(scope),
        }
    }

    pub(crate) fn outline(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match self {
            Fragment::Empty => {
                out.push_str(&format!("{pad}empty\n"));
            }
            Fragment::Literal(text) => {
                out.push_str(&format!("{pad}literal {text:?}\n"));
            }
            Fragment::Sequence(sequence) => {
                out.push_str(&format!("{pad}sequence sep={:?}\n", sequence.separator));
                for item in &sequence.items {
                    item.outline(out, depth + 1);
                }
            }
            Fragment::Expr(expr) => {
                out.push_str(&format!(
                    "{pad}expr [{}] escape={}\n",
                    expr.expr.source(),
                    expr.escape
                ));
            }
            Fragment::Element(element) => {
                let gate = element
                    .gate
                    .as_ref()
                    .map(|gate| format!(" gate={}", gate.temp))
                    .unwrap_or_default();
                out.push_str(&format!("{pad}element <{}>{}\n", element.tag, gate));
                for attr in &element.attrs {
                    attr.outline(out, depth + 1);
                }
                if let Some(content) = &element.content {
                    out.push_str(&format!("{pad}  content:\n"));
                    content.outline(out, depth + 2);
                }
                if let Some(gate) = &element.gate {
                    gate.value.outline(out, &format!("{pad}  "), depth + 1);
                }
            }
            Fragment::OmitEmptyAttr(attr) => {
                out.push_str(&format!("{pad}attr {}? temp={}\n", attr.name, attr.temp));
                attr.value.outline(out, &format!("{pad}  "), depth + 1);
            }
            Fragment::Conditional(conditional) => {
                out.push_str(&format!(
                    "{pad}test [{}] temp={}\n",
                    conditional.test.source(),
                    conditional.temp
                ));
                let mut branch = |label: &str, fragment: &Option<Fragment>, out: &mut String| {
                    if let Some(fragment) = fragment {
                        out.push_str(&format!("{pad}  {label}:\n"));
                        fragment.outline(out, depth + 2);
                    }
                };
                match &conditional.mode {
                    ConditionalMode::Truth { yes, no } => {
                        branch("yes", yes, out);
                        branch("no", no, out);
                    }
                    ConditionalMode::Emptiness { empty, not_empty } => {
                        branch("empty", empty, out);
                        branch("notEmpty", not_empty, out);
                    }
                    ConditionalMode::Count {
                        plural,
                        singular,
                        none,
                    } => {
                        branch("plural", plural, out);
                        branch("singular", singular, out);
                        branch("none", none, out);
                    }
                }
            }
            Fragment::Iteration(iteration) => {
                out.push_str(&format!(
                    "{pad}each [{}] item={} index={}\n",
                    iteration.each.source(),
                    iteration.item_var,
                    iteration.index_var
                ));
                if let Some(filter) = &iteration.filter {
                    out.push_str(&format!("{pad}  filter [{}]\n", filter.source()));
                }
                for (label, segment) in [
                    ("first", &iteration.first),
                    ("content", &iteration.content),
                    ("last", &iteration.last),
                ] {
                    if let Some(fragment) = segment {
                        out.push_str(&format!("{pad}  {label}:\n"));
                        fragment.outline(out, depth + 2);
                    }
                }
            }
            Fragment::SlotRef(slot) => {
                out.push_str(&format!(
                    "{pad}slot {{{}}} escape={}\n",
                    slot.name, slot.escape
                ));
            }
            Fragment::Use(composed) => {
                out.push_str(&format!("{pad}use template\n"));
                for (name, fragment) in &composed.bindings {
                    out.push_str(&format!("{pad}  {name}:\n"));
                    fragment.outline(out, depth + 2);
                }
            }
        }
    }
}

impl SequenceFragment {
    fn render(&self, scope: &mut Scope<'_>) -> Result<String, RenderError> {
        let mut out = String::new();
        for item in &self.items {
            let piece = item.render(scope)?;
            if piece.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push_str(&self.separator);
            }
            out.push_str(&piece);
        }
        Ok(out)
    }
}

impl ExprFragment {
    fn render(&self, scope: &mut Scope<'_>) -> Result<String, RenderError> {
        let value = self.expr.evaluate(scope)?;
        let text = value.to_output_string();
        Ok(if self.escape { escape_markup(&text) } else { text })
    }
}

impl ElementFragment {
    fn render(&self, scope: &mut Scope<'_>) -> Result<String, RenderError> {
        if let Some(gate) = &self.gate {
            // Content decides first; attribute expressions never run
            // for a suppressed element.
            let body = match gate.value.probe(scope)? {
                Some(body) => body,
                None => return Ok(String::new()),
            };
            let mut out = self.render_opening(scope)?;
            out.push_str(&body);
            self.push_closing(&mut out);
            return Ok(out);
        }

        let mut out = self.render_opening(scope)?;
        if let Some(content) = &self.content {
            out.push_str(&content.render(scope)?);
        }
        if self.close_tag {
            self.push_closing(&mut out);
        }
        Ok(out)
    }

    fn render_opening(&self, scope: &mut Scope<'_>) -> Result<String, RenderError> {
        let mut out = String::new();
        out.push('<');
        out.push_str(&self.tag);
        for attr in &self.attrs {
            out.push_str(&attr.render(scope)?);
        }
        out.push('>');
        Ok(out)
    }

    fn push_closing(&self, out: &mut String) {
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl OmitEmptyAttrFragment {
    fn render(&self, scope: &mut Scope<'_>) -> Result<String, RenderError> {
        match self.value.probe(scope)? {
            Some(text) => Ok(format!(" {}=\"{}\"", self.name, text)),
            None => Ok(String::new()),
        }
    }
}

impl ConditionalFragment {
    fn render(&self, scope: &mut Scope<'_>) -> Result<String, RenderError> {
        let tested = self.test.evaluate(scope)?;
        match &self.mode {
            ConditionalMode::Truth { yes, no } => {
                let branch = if tested.is_truthy() { yes } else { no };
                render_optional(branch, scope)
            }
            ConditionalMode::Emptiness { empty, not_empty } => {
                let len = match &tested {
                    Value::Array(items) => items.borrow().len(),
                    _ => return Ok(String::new()),
                };
                let branch = if len == 0 { empty } else { not_empty };
                render_optional(branch, scope)
            }
            ConditionalMode::Count {
                plural,
                singular,
                none,
            } => {
                let count = match &tested {
                    Value::Array(items) => Value::Int(items.borrow().len() as i64),
                    other => other.clone(),
                };
                // Branch priority: none on exactly zero, plural on
                // anything but exactly one, singular on exactly one.
                if none.is_some() && value::strict_equals(&count, &Value::Int(0)) {
                    return render_optional(none, scope);
                }
                if plural.is_some() && !value::strict_equals(&count, &Value::Int(1)) {
                    return render_optional(plural, scope);
                }
                if singular.is_some() && value::strict_equals(&count, &Value::Int(1)) {
                    return render_optional(singular, scope);
                }
                Ok(String::new())
            }
        }
    }
}

fn render_optional(
    branch: &Option<Fragment>,
    scope: &mut Scope<'_>,
) -> Result<String, RenderError> {
    match branch {
        Some(fragment) => fragment.render(scope),
        None => Ok(String::new()),
    }
}

/// Iteration source with its length captured up front. Items are
/// fetched live, so an expression that pushes into the array mid-walk
/// mutates it without extending this walk.
enum IterationItems {
    List(Rc<RefCell<Vec<Value>>>),
    Chars(Vec<Value>),
    None,
}

impl IterationItems {
    fn from_value(value: &Value) -> IterationItems {
        match value {
            Value::Array(items) => IterationItems::List(Rc::clone(items)),
            Value::Str(s) => {
                IterationItems::Chars(s.chars().map(|c| Value::Str(c.to_string())).collect())
            }
            _ => IterationItems::None,
        }
    }

    fn len(&self) -> usize {
        match self {
            IterationItems::List(items) => items.borrow().len(),
            IterationItems::Chars(chars) => chars.len(),
            IterationItems::None => 0,
        }
    }

    fn fetch(&self, index: usize) -> Value {
        match self {
            IterationItems::List(items) => {
                items.borrow().get(index).cloned().unwrap_or(Value::Null)
            }
            IterationItems::Chars(chars) => chars.get(index).cloned().unwrap_or(Value::Null),
            IterationItems::None => Value::Null,
        }
    }
}

impl IterationFragment {
    fn render(&self, scope: &mut Scope<'_>) -> Result<String, RenderError> {
        let source = self.each.evaluate(scope)?;
        let items = IterationItems::from_value(&source);
        let len = items.len();

        let mut frame = IndexMap::new();
        frame.insert(self.item_var.clone(), Value::Null);
        frame.insert(self.index_var.clone(), Value::Int(0));
        scope.push_vars(frame);
        let result = self.render_segments(scope, &items, len);
        scope.pop();
        result
    }

    fn bind(&self, scope: &mut Scope<'_>, items: &IterationItems, index: usize) {
        scope.rebind(&self.item_var, items.fetch(index));
        scope.rebind(&self.index_var, Value::Int(index as i64));
    }

    fn render_segments(
        &self,
        scope: &mut Scope<'_>,
        items: &IterationItems,
        len: usize,
    ) -> Result<String, RenderError> {
        let mut out = String::new();
        let mut index = 0usize;

        if let Some(filter) = &self.filter {
            // Scan for the first passing item; the cursor stays there.
            // No match at all means no output, not even `first`.
            let mut matched = false;
            while index < len {
                self.bind(scope, items, index);
                if filter.evaluate(scope)?.is_truthy() {
                    matched = true;
                    break;
                }
                index += 1;
            }
            if !matched {
                return Ok(out);
            }
            if self.first.is_some() {
                out.push_str(&render_optional(&self.first, scope)?);
                out.push('\n');
            }
        } else if self.first.is_some() && len > 0 {
            self.bind(scope, items, 0);
            out.push_str(&render_optional(&self.first, scope)?);
            out.push('\n');
        }

        let mut last_match: Option<usize> = None;
        if self.content.is_some() {
            while index < len {
                self.bind(scope, items, index);
                let passes = match &self.filter {
                    Some(filter) => filter.evaluate(scope)?.is_truthy(),
                    None => true,
                };
                if passes {
                    last_match = Some(index);
                    out.push_str(&render_optional(&self.content, scope)?);
                    // Items join with a newline keyed to the raw index,
                    // so trailing filtered-out items still leave one.
                    if self.last.is_some() || index + 1 < len {
                        out.push('\n');
                    }
                }
                index += 1;
            }
        }

        if self.last.is_some() && len > 0 {
            let final_index = match &self.filter {
                // With a filter the closer needs a content match to
                // anchor to.
                Some(_) => last_match,
                None => Some(len - 1),
            };
            if let Some(at) = final_index {
                self.bind(scope, items, at);
                out.push_str(&render_optional(&self.last, scope)?);
            }
        }

        Ok(out)
    }
}

impl SlotRefFragment {
    fn render(&self, scope: &mut Scope<'_>) -> Result<String, RenderError> {
        let bound = scope
            .lookup_slot(&self.name)
            .ok_or_else(|| RenderError::UnsetSlot(self.name.clone()))?;
        Ok(if self.escape {
            escape_markup(bound)
        } else {
            bound.to_string()
        })
    }
}

impl UseFragment {
    fn render(&self, scope: &mut Scope<'_>) -> Result<String, RenderError> {
        // Bindings resolve eagerly at the use site, each exactly once,
        // before the target's body runs.
        let mut frame = IndexMap::new();
        for (name, fragment) in &self.bindings {
            frame.insert(name.clone(), fragment.render(scope)?);
        }
        scope.push_slots(frame);
        let result = self.template.root().render(scope);
        scope.pop();
        result
    }
}
