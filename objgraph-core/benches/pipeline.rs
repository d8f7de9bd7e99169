//! Build → layout → match throughput on a wide, fully expanded heap.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use objgraph_core::config::{BuilderConfig, LayoutConfig};
use objgraph_core::debuggee::{HeapDebuggee, HeapValue};
use objgraph_core::expanded::Expanded;
use objgraph_core::graph::{content_path, ObjectGraphBuilder};
use objgraph_core::layout::{LayoutDirection, TreeLayout};
use objgraph_core::matcher::GraphMatcher;

const ORDERS: usize = 64;

/// `orders` is a list of orders, each with a customer shared by every
/// fourth order and a line list.
fn heap() -> (HeapDebuggee, Expanded) {
    let mut heap = HeapDebuggee::new();
    let mut expanded = Expanded::new();
    let orders = heap.alloc_list("List<Order>");
    let customers: Vec<_> = (0..ORDERS / 4)
        .map(|index| {
            let customer = heap.alloc("Customer");
            heap.set_field(customer, "name", HeapValue::atomic("string", format!("\"c{index}\"")));
            customer
        })
        .collect();

    for index in 0..ORDERS {
        let order = heap.alloc("Order");
        heap.set_field(order, "id", HeapValue::atomic("int", index.to_string()));
        heap.set_field(order, "customer", customers[index / 4]);
        let lines = heap.alloc_list("List<Line>");
        for quantity in 0..3 {
            let line = heap.alloc("Line");
            heap.set_field(line, "quantity", HeapValue::atomic("int", quantity.to_string()));
            heap.push_element(lines, line);
        }
        heap.set_field(order, "lines", lines);
        heap.push_element(orders, order);

        let order_expression = format!("orders[{index}]");
        expanded.set_content_expanded(content_path("orders", index));
        expanded.set_property_expanded(format!("{order_expression}.customer"));
        expanded.set_property_expanded(format!("{order_expression}.lines"));
        let lines_expression = format!("{order_expression}.lines");
        for line in 0..3 {
            expanded.set_content_expanded(content_path(&lines_expression, line));
        }
    }
    heap.set_local("orders", orders);
    (heap, expanded)
}

fn bench_pipeline(c: &mut Criterion) {
    let (heap, expanded) = heap();
    let builder = ObjectGraphBuilder::new(&heap, BuilderConfig::default());
    let graph = builder.build_graph_for_expression("orders", &expanded).unwrap();
    let layout = TreeLayout::new(LayoutDirection::LeftRight, LayoutConfig::default());
    let positioned = layout.calculate_layout(&graph, &expanded).unwrap();

    c.bench_function("build", |b| {
        b.iter(|| builder.build_graph_for_expression(black_box("orders"), &expanded).unwrap())
    });
    c.bench_function("layout", |b| {
        b.iter(|| layout.calculate_layout(black_box(&graph), &expanded).unwrap())
    });
    c.bench_function("match", |b| {
        b.iter(|| {
            GraphMatcher::new()
                .match_graphs(Some(black_box(&positioned)), &positioned)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
