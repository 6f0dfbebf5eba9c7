use crate::geometry::{Aabb, Geometry};
use crate::light::DirectionalLight;
use crate::material::{Material, Mesh};
use glam::{Mat4, Vec3};
use stagecraft_common::Transform;
use std::sync::Arc;
use uuid::Uuid;

/// Index of a node inside its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// What a node contributes to the frame.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
    DirectionalLight(DirectionalLight),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Group => "group",
            NodeKind::Mesh(_) => "mesh",
            NodeKind::DirectionalLight(_) => "light",
        }
    }
}

/// A scene graph node.
#[derive(Debug, Clone)]
pub struct Node {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: None,
            transform: Transform::default(),
            visible: true,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    pub fn mesh(mesh: Mesh) -> Self {
        Self::new(NodeKind::Mesh(mesh))
    }

    pub fn light(light: DirectionalLight) -> Self {
        Self::new(NodeKind::DirectionalLight(light))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Short label for logs and debug output.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.uuid.to_string()[..8].to_string(),
        }
    }
}

/// A visible mesh with its resolved world matrix.
#[derive(Debug, Clone)]
pub struct MeshDraw {
    pub node: NodeId,
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub world: Mat4,
}

/// A visible directional light in world space.
#[derive(Debug, Clone, Copy)]
pub struct LightDraw {
    pub node: NodeId,
    pub light: DirectionalLight,
    pub position: Vec3,
}

impl LightDraw {
    pub fn direction_to_light(&self) -> Vec3 {
        DirectionalLight::direction_to_light(self.position)
    }
}

/// Errors from scene graph operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("node not found: {0:?}")]
    UnknownNode(NodeId),
}

/// Arena-backed scene graph.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at the root of the scene.
    pub fn add(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        self.roots.push(id);
        id
    }

    /// Add a node under `parent`.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        if parent.0 >= self.nodes.len() {
            return Err(SceneError::UnknownNode(parent));
        }
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Graft every root of `other` under a new group node at the root of this
    /// scene. Returns the group. Geometry is shared, not copied.
    pub fn add_scene(&mut self, other: Scene) -> NodeId {
        self.add_scene_named(other, None)
    }

    pub fn add_scene_named(&mut self, other: Scene, name: Option<String>) -> NodeId {
        let mut group = Node::group();
        group.name = name;
        let group_id = self.add(group);
        let offset = self.nodes.len();

        let Scene { nodes, roots } = other;
        for mut node in nodes {
            node.parent = Some(node.parent.map_or(group_id, |p| NodeId(p.0 + offset)));
            for child in &mut node.children {
                child.0 += offset;
            }
            self.nodes.push(node);
        }
        let grafted = roots.into_iter().map(|r| NodeId(r.0 + offset));
        self.nodes[group_id.0].children.extend(grafted);

        tracing::debug!(
            group = group_id.0,
            nodes = self.nodes.len() - offset,
            "grafted scene"
        );
        group_id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// First node with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes()
            .find(|(_, n)| n.name.as_deref() == Some(name))
            .map(|(id, _)| id)
    }

    /// Product of the local matrices from the root down to `id`.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let mut node = self.node(id).ok_or(SceneError::UnknownNode(id))?;
        let mut m = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = &self.nodes[parent.0];
            m = node.transform.matrix() * m;
        }
        Ok(m)
    }

    /// Depth-first traversal of visible nodes, roots in insertion order.
    pub fn visit(&self, mut f: impl FnMut(NodeId, &Node, Mat4)) {
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|id| (*id, Mat4::IDENTITY))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            f(id, node, world);
            for child in node.children.iter().rev() {
                stack.push((*child, world));
            }
        }
    }

    /// Visible meshes in traversal order.
    pub fn meshes(&self) -> Vec<MeshDraw> {
        let mut out = Vec::new();
        self.visit(|id, node, world| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                out.push(MeshDraw {
                    node: id,
                    geometry: Arc::clone(&mesh.geometry),
                    material: mesh.material,
                    world,
                });
            }
        });
        out
    }

    /// Visible directional lights in traversal order.
    pub fn lights(&self) -> Vec<LightDraw> {
        let mut out = Vec::new();
        self.visit(|id, node, world| {
            if let NodeKind::DirectionalLight(light) = &node.kind {
                out.push(LightDraw {
                    node: id,
                    light: *light,
                    position: world.w_axis.truncate(),
                });
            }
        });
        out
    }

    /// World-space bounds of every visible mesh.
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.meshes()
            .iter()
            .filter_map(|draw| draw.geometry.bounds().map(|b| b.transformed(draw.world)))
            .reduce(Aabb::union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagecraft_common::Color;

    fn cube() -> Mesh {
        Mesh::new(Geometry::cube(1.0, 1.0, 1.0), Material::default())
    }

    #[test]
    fn add_and_lookup() {
        let mut scene = Scene::new();
        let id = scene.add(Node::group().with_name("root"));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.find_by_name("root"), Some(id));
        assert_eq!(scene.roots(), &[id]);
    }

    #[test]
    fn add_child_to_unknown_parent_fails() {
        let mut scene = Scene::new();
        let err = scene.add_child(NodeId(7), Node::group());
        assert!(matches!(err, Err(SceneError::UnknownNode(NodeId(7)))));
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut scene = Scene::new();
        let parent = scene.add(Node::group().at(Vec3::new(1.0, 0.0, 0.0)));
        let child = scene
            .add_child(parent, Node::group().at(Vec3::new(0.0, 2.0, 0.0)))
            .unwrap();
        let m = scene.world_matrix(child).unwrap();
        assert_eq!(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn visit_is_depth_first_in_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.add(Node::group().with_name("a"));
        let a1 = scene.add_child(a, Node::group().with_name("a1")).unwrap();
        scene.add_child(a1, Node::group().with_name("a1x")).unwrap();
        scene.add_child(a, Node::group().with_name("a2")).unwrap();
        scene.add(Node::group().with_name("b"));

        let mut order = Vec::new();
        scene.visit(|_, node, _| order.push(node.label()));
        assert_eq!(order, vec!["a", "a1", "a1x", "a2", "b"]);
    }

    #[test]
    fn invisible_nodes_prune_subtree() {
        let mut scene = Scene::new();
        let hidden = scene.add(Node::group());
        scene.add_child(hidden, Node::mesh(cube())).unwrap();
        scene.add(Node::mesh(cube()));
        scene.node_mut(hidden).unwrap().visible = false;
        assert_eq!(scene.meshes().len(), 1);
    }

    #[test]
    fn lights_report_world_position() {
        let mut scene = Scene::new();
        let rig = scene.add(Node::group().at(Vec3::new(0.0, 10.0, 0.0)));
        scene
            .add_child(
                rig,
                Node::light(DirectionalLight::new(Color::WHITE, 3.0)).at(Vec3::new(1.0, 0.0, 0.0)),
            )
            .unwrap();
        let lights = scene.lights();
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].position, Vec3::new(1.0, 10.0, 0.0));
        assert_eq!(lights[0].light.intensity, 3.0);
    }

    #[test]
    fn add_scene_reindexes_nodes() {
        let mut model = Scene::new();
        let body = model.add(Node::group().with_name("body"));
        model
            .add_child(body, Node::mesh(cube()).with_name("part"))
            .unwrap();

        let mut scene = Scene::new();
        scene.add(Node::light(DirectionalLight::default()));
        let group = scene.add_scene_named(model, Some("model".into()));

        assert_eq!(scene.len(), 4);
        let body_id = scene.find_by_name("body").unwrap();
        let part_id = scene.find_by_name("part").unwrap();
        assert_eq!(scene.node(body_id).unwrap().parent(), Some(group));
        assert_eq!(scene.node(part_id).unwrap().parent(), Some(body_id));
        assert_eq!(scene.node(group).unwrap().children(), &[body_id]);
        assert_eq!(scene.meshes().len(), 1);
    }

    #[test]
    fn bounding_box_uses_world_space() {
        let mut scene = Scene::new();
        assert!(scene.bounding_box().is_none());
        scene.add(Node::mesh(cube()).at(Vec3::new(2.0, 0.0, 0.0)));
        let b = scene.bounding_box().unwrap();
        assert_eq!(b.min, Vec3::new(1.5, -0.5, -0.5));
        assert_eq!(b.max, Vec3::new(2.5, 0.5, 0.5));
    }
}
