use std::fmt;

pub fn display_fn(f: impl Fn(&mut fmt::Formatter<'_>) -> fmt::Result) -> impl fmt::Display {
    DisplayFn(f)
}

struct DisplayFn<F>(F);
impl<F> fmt::Display for DisplayFn<F>
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.0)(formatter)
    }
}

/// Write `items` separated by `sep`.
pub(crate) fn write_separated<I>(f: &mut fmt::Formatter<'_>, sep: &str, items: I) -> fmt::Result
where
    I: IntoIterator,
    I::Item: fmt::Display,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
