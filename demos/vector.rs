use std::fmt;

use idtree::tree_traits::TreeNodeConvert;
use idtree::util::testing::init_test_setup;
use idtree::{Node, Tree, TreeResult};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Vector3D {
    x: f64,
    y: f64,
    z: f64,
}

impl Vector3D {
    fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl fmt::Display for Vector3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

fn main() -> TreeResult<()> {
    init_test_setup();

    let mut tree = Tree::new();
    tree.set_root(Node::new(0, Vector3D::new(0.0, 0.0, 0.0)))?;
    tree.attach(0, Node::new(1, Vector3D::new(1.0, 0.0, 0.0)))?;
    tree.attach(0, Node::new(2, Vector3D::new(0.0, 4.0, 0.0)))?;
    tree.attach(1, Node::new(3, Vector3D::new(1.0, 1.0, 0.0)))?;
    tree.attach(2, Node::new(4, Vector3D::new(0.0, 4.0, 9.0)))?;

    println!("{}", tree);
    println!();
    println!("{}", tree.to_tree_string());

    if let Some(path) = tree.backtrack_from(4) {
        let labels: Vec<String> = path.iter().map(|n| n.data().to_string()).collect();
        println!("path from 4: {}", labels.join(" <- "));
    }

    if let Some(short) = tree.filter_tree(|v| v.norm() < 5.0) {
        println!();
        println!("vectors shorter than 5:");
        println!("{}", short.to_tree_string());
    }

    Ok(())
}
