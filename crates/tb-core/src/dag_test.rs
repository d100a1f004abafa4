use super::*;
use crate::block::{BlockLanguage, BlockType};

fn block(uuid: &str, upstream: Vec<Block>) -> Block {
    let mut b = Block::new(uuid, BlockType::Dbt, BlockLanguage::Sql, "etl");
    b.upstream_blocks = upstream;
    b
}

#[test]
fn test_from_blocks_orders_dependencies_first() {
    let stg_orders = block("stg_orders", vec![]);
    let stg_customers = block("stg_customers", vec![]);
    let fct = block("fct_orders", vec![stg_orders, stg_customers]);

    let dag = BlockDag::from_blocks(&[fct]);
    let order = dag.topological_order().unwrap();

    let fct_pos = order.iter().position(|m| m == "fct_orders").unwrap();
    let orders_pos = order.iter().position(|m| m == "stg_orders").unwrap();
    let customers_pos = order.iter().position(|m| m == "stg_customers").unwrap();

    assert!(fct_pos > orders_pos);
    assert!(fct_pos > customers_pos);
    assert_eq!(dag.len(), 3);
}

#[test]
fn test_nested_upstream_is_walked() {
    let raw = block("raw", vec![]);
    let stg = block("stg", vec![raw]);
    let mart = block("mart", vec![stg]);

    let dag = BlockDag::from_blocks(&[mart]);
    assert_eq!(dag.topological_order().unwrap(), vec!["raw", "stg", "mart"]);
}

#[test]
fn test_circular_dependency() {
    let mut dag = BlockDag::new();
    dag.add_dependency("a", "b");
    dag.add_dependency("b", "c");
    dag.add_dependency("c", "a");

    let result = dag.validate();
    assert!(matches!(
        result.unwrap_err(),
        CoreError::CircularDependency { .. }
    ));
}

#[test]
fn test_duplicate_edges_collapse() {
    let mut dag = BlockDag::new();
    dag.add_dependency("a", "b");
    dag.add_dependency("a", "b");
    assert_eq!(dag.len(), 2);
    assert_eq!(dag.topological_order().unwrap(), vec!["b", "a"]);
}
