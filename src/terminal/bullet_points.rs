const INDENT_SIZE: usize = 2;

pub struct BulletPointPrinter<W: LineWriter + Clone = StdoutLineWriter> {
    writer: W,
    nesting: usize,
}

impl<W: LineWriter + Clone> BulletPointPrinter<W> {
    pub fn new_with_writer(writer: W) -> Self {
        Self { writer, nesting: 0 }
    }

    pub fn print_item(&self, message: impl std::fmt::Display) {
        let indent = " ".repeat(self.nesting * INDENT_SIZE);
        self.writer.write_line(&format!("{}• {}", indent, message));
    }

    pub fn indent(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            nesting: self.nesting + 1,
        }
    }
}

impl BulletPointPrinter<StdoutLineWriter> {
    pub fn new() -> Self {
        Self::new_with_writer(StdoutLineWriter)
    }
}

pub trait LineWriter {
    fn write_line(&self, line: &str);
}

#[derive(Clone, Copy)]
pub struct StdoutLineWriter;
impl LineWriter for StdoutLineWriter {
    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingLineWriter {
        lines: Rc<RefCell<Vec<String>>>,
    }

    impl LineWriter for RecordingLineWriter {
        fn write_line(&self, line: &str) {
            self.lines.borrow_mut().push(line.to_string());
        }
    }

    #[test]
    fn nested_items_are_indented() {
        let writer = RecordingLineWriter::default();
        let printer = BulletPointPrinter::new_with_writer(writer.clone());
        printer.print_item("STORE_001");
        let nested = printer.indent();
        nested.print_item("2024-07");
        nested.indent().print_item("$10.00");
        printer.print_item("STORE_002");

        assert_eq!(
            vec!["• STORE_001", "  • 2024-07", "    • $10.00", "• STORE_002"],
            *writer.lines.borrow()
        );
    }
}
