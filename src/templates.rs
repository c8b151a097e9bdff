use std::sync::OnceLock;
use tera::Tera;

static TERA: OnceLock<Tera> = OnceLock::new();

/// Templates are compiled into the binary so the service runs from any
/// working directory.
pub fn get_tera() -> &'static Tera {
    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("form.html", include_str!("../templates/form.html")),
            ("summary.html", include_str!("../templates/summary.html")),
        ])
        .expect("built-in templates must parse");
        tera
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_templates_are_registered() {
        let tera = get_tera();
        let names: Vec<&str> = tera.get_template_names().collect();
        assert!(names.contains(&"form.html"));
        assert!(names.contains(&"summary.html"));
    }
}
