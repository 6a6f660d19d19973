use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scribe_parser::deserialize_html;

const SPAN: &str = r#"<span style="font-size:16px;color:#181d23">"#;

fn pasted_page() -> String {
    let mut html = String::from("<html><head><title>Pasted</title></head><body>");
    for i in 0..200 {
        html.push_str(&format!(
            "<p>{SPAN}Paragraph {i} </span><a href=\"https://example.com/{i}\">{SPAN}link</span></a>\
             <strong><em>{SPAN}styled</span></em></strong></p>"
        ));
    }
    html.push_str("<ul>");
    for i in 0..50 {
        html.push_str(&format!("<li>{SPAN}item {i}</span></li>"));
    }
    html.push_str("</ul></body></html>");
    html
}

fn deserialize_paragraph(c: &mut Criterion) {
    let source = r#"<p>Go to <a href="https://x.com">x</a> now</p>"#;
    c.bench_function("deserialize_paragraph", |b| {
        b.iter(|| deserialize_html(black_box(source)))
    });
}

fn deserialize_page(c: &mut Criterion) {
    let source = pasted_page();
    c.bench_function("deserialize_page", |b| {
        b.iter(|| deserialize_html(black_box(&source)))
    });
}

criterion_group!(benches, deserialize_paragraph, deserialize_page);
criterion_main!(benches);
