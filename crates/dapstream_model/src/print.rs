//! Declaration and value text.
//!
//! Declarations use the keyword form read back by the declaration parser:
//!
//! ```text
//! Dataset {
//!     Int16 a[dim1 = 4];
//!     Sequence {
//!         String name;
//!         Int32 age;
//!     } people;
//! } D;
//! ```

use std::fmt::Write as _;

use dapstream_foundation::escape::id_to_www;
use dapstream_foundation::{TypeKind, Value};

use crate::array::Array;
use crate::dataset::Dataset;
use crate::variable::{Body, Variable};

const INDENT: usize = 4;

impl Variable {
    /// Appends this variable's declaration.
    ///
    /// With `constrained`, unselected nodes are omitted and array
    /// dimensions show their constrained sizes.
    pub fn print_declaration(&self, out: &mut String, indent: usize, constrained: bool) {
        if constrained && !self.is_selected() {
            return;
        }
        self.print_head(out, indent, constrained);
        out.push_str(";\n");
    }

    /// Appends the declaration without its closing `;`.
    fn print_head(&self, out: &mut String, indent: usize, constrained: bool) {
        let pad = " ".repeat(indent);
        let name = id_to_www(self.name());
        match self.body() {
            Body::Scalar(v) => {
                let _ = write!(out, "{pad}{} {name}", v.kind());
            }
            Body::Array(array) => {
                let template = array.template();
                if template.type_kind().is_constructor() {
                    let _ = writeln!(out, "{pad}{} {{", template.type_kind());
                    print_children(template.children(), out, indent + INDENT, constrained);
                    let _ = write!(out, "{pad}}} {name}");
                } else {
                    let _ = write!(out, "{pad}{} {name}", template.type_kind());
                }
                print_dimensions(array, out, constrained);
            }
            Body::Record(_) | Body::Table(_) => {
                let _ = writeln!(out, "{pad}{} {{", self.type_kind());
                print_children(self.children(), out, indent + INDENT, constrained);
                let _ = write!(out, "{pad}}} {name}");
            }
        }
    }

    /// Appends this variable's value, optionally preceded by its declaration.
    pub fn print_value(&self, out: &mut String, indent: usize, with_declaration: bool) {
        if with_declaration {
            self.print_head(out, indent, false);
            out.push_str(" = ");
        } else {
            out.push_str(&" ".repeat(indent));
        }
        out.push_str(&self.value_text());
        if with_declaration {
            out.push_str(";\n");
        }
    }

    /// The value alone, as it appears after `=` in [`Variable::print_value`].
    #[must_use]
    pub fn value_text(&self) -> String {
        match self.body() {
            Body::Scalar(v) => v.to_string(),
            Body::Array(array) => array_text(array),
            Body::Record(record) => braced(record.iter().map(Variable::value_text)),
            Body::Table(table) => {
                if table.instances().is_empty() {
                    return "{ }".to_string();
                }
                braced(
                    table
                        .instances()
                        .iter()
                        .map(|row| braced(row.iter().map(Variable::value_text))),
                )
            }
        }
    }
}

fn print_children(children: &[Variable], out: &mut String, indent: usize, constrained: bool) {
    for child in children {
        child.print_declaration(out, indent, constrained);
    }
}

fn print_dimensions(array: &Array, out: &mut String, constrained: bool) {
    for dim in array.dimensions() {
        let size = if constrained { dim.constrained_len() } else { dim.size };
        if dim.name.is_empty() {
            let _ = write!(out, "[{size}]");
        } else {
            let _ = write!(out, "[{} = {size}]", id_to_www(&dim.name));
        }
    }
}

fn braced(items: impl Iterator<Item = String>) -> String {
    let inner: Vec<String> = items.collect();
    if inner.is_empty() {
        "{ }".to_string()
    } else {
        format!("{{ {} }}", inner.join(", "))
    }
}

fn array_text(array: &Array) -> String {
    if array.template().type_kind() == TypeKind::Record {
        return braced(array.members().iter().map(Variable::value_text));
    }
    let sizes: Vec<usize> = array
        .dimensions()
        .iter()
        .map(|d| d.constrained_len())
        .collect();
    let mut out = String::new();
    nest_values(array.values(), &sizes, &mut out);
    out
}

/// Writes `values` as nested braces, one level per dimension.
fn nest_values(values: &[Value], sizes: &[usize], out: &mut String) {
    let Some((&outer, inner)) = sizes.split_first() else {
        return;
    };
    let stride: usize = inner.iter().product();
    out.push('{');
    for i in 0..outer {
        if i > 0 {
            out.push_str(", ");
        }
        let chunk = values.get(i * stride..(i + 1) * stride).unwrap_or(&[]);
        if inner.is_empty() {
            if let Some(v) = chunk.first() {
                let _ = write!(out, "{v}");
            }
        } else {
            nest_values(chunk, inner, out);
        }
    }
    out.push('}');
}

impl Dataset {
    /// The full declaration text.
    #[must_use]
    pub fn print_declaration(&self) -> String {
        self.print(false)
    }

    /// The declaration of selected variables only, with constrained sizes.
    #[must_use]
    pub fn print_constrained(&self) -> String {
        self.print(true)
    }

    fn print(&self, constrained: bool) -> String {
        let mut out = String::from("Dataset {\n");
        print_children(self.variables(), &mut out, INDENT, constrained);
        let _ = writeln!(out, "}} {};", id_to_www(self.name()));
        out
    }

    /// Every top-level variable as `declaration = value;`.
    #[must_use]
    pub fn print_values(&self) -> String {
        let mut out = String::new();
        for var in self.variables() {
            var.print_value(&mut out, 0, true);
        }
        out
    }
}
