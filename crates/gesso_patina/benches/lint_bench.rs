//! Benchmark for gesso_patina linter.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use gesso_patina::Linter;

fn large_template(indent: &str) -> String {
    let mut template = String::from("<view class=\"list\">\n");
    for i in 0..100 {
        template.push_str(&format!(
            "{indent}<view wx:if=\"{{{{ show{i} }}}}\">\n{indent}{indent}<text>{{{{ message{i} }}}}</text>\n{indent}{indent}<button bindtap=\"handle{i}\">Button {i}</button>\n{indent}</view>\n",
        ));
    }
    template.push_str("</view>\n");
    template
}

fn bench_lint_template(c: &mut Criterion) {
    let template = r#"<view class="container">
  <text wx:if="{{ show }}">{{ message }}</text>
  <text wx:else>{{ fallback }}</text>
  <button bindtap="handleClick">Click me</button>
  <view wx:for="{{ items }}" wx:key="id">
    <text>{{ item.name }}</text>
  </view>
</view>
"#;

    let linter = Linter::new();

    let mut group = c.benchmark_group("template");
    group.throughput(Throughput::Bytes(template.len() as u64));

    group.bench_function("lint_small", |b| {
        b.iter(|| linter.lint(black_box(template), "index.wxml"))
    });

    group.finish();
}

fn bench_lint_large_template(c: &mut Criterion) {
    let template = large_template("  ");
    let linter = Linter::new();

    let mut group = c.benchmark_group("template");
    group.throughput(Throughput::Bytes(template.len() as u64));

    group.bench_function("lint_large", |b| {
        b.iter(|| linter.lint(black_box(&template), "index.wxml"))
    });

    group.finish();
}

fn bench_lint_script(c: &mut Criterion) {
    let template = r#"<wxs module="util">
var format = function (value, options) {
  if (!value) {
    return ''
  }
  var parts = value.split('.')
  switch (options.mode) {
    case 'short':
      return parts[0]
    default:
      return parts
        .map(function (part) { return part.trim() })
        .join('-')
  }
}
module.exports = {
  format: format,
}
</wxs>
<view>{{ util.format(value, { mode: 'short' }) }}</view>
"#;

    let linter = Linter::new();

    let mut group = c.benchmark_group("script");
    group.throughput(Throughput::Bytes(template.len() as u64));

    group.bench_function("lint_wxs", |b| {
        b.iter(|| linter.lint(black_box(template), "index.wxml"))
    });

    group.finish();
}

fn bench_fix_large_template(c: &mut Criterion) {
    // Four-space input against the default two-space style
    let template = large_template("    ");
    let linter = Linter::new();

    let mut group = c.benchmark_group("fix");
    group.throughput(Throughput::Bytes(template.len() as u64));

    group.bench_function("fix_large", |b| {
        b.iter(|| linter.fix(black_box(&template), "index.wxml"))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lint_template,
    bench_lint_large_template,
    bench_lint_script,
    bench_fix_large_template
);
criterion_main!(benches);
