/// Capability test that decides whether a source element has the shape a view
/// projects, and extracts it if so.
///
/// The test belongs to the projected type, not to the view: every
/// `FilteredView<T, U>` admits exactly the elements for which
/// `U::narrow(element)` is `Some`, and then applies its caller predicate on
/// top. Every `T: Clone` narrows to itself, so `FilteredView<T, T>` is a
/// plain predicate filter.
///
/// Implementations must be pure: the same unchanged element must always
/// narrow to an equal value.
///
/// ```
/// use std::rc::Rc;
/// use xeno_observable::Narrow;
///
/// enum Node {
/// 	Element(Rc<str>),
/// 	Text(Rc<str>),
/// }
///
/// #[derive(Clone)]
/// struct Element(Rc<str>);
///
/// impl Narrow<Node> for Element {
/// 	fn narrow(node: &Node) -> Option<Self> {
/// 		match node {
/// 			Node::Element(name) => Some(Element(name.clone())),
/// 			Node::Text(_) => None,
/// 		}
/// 	}
/// }
///
/// assert!(Element::narrow(&Node::Element("a".into())).is_some());
/// assert!(Element::narrow(&Node::Text("hi".into())).is_none());
/// ```
pub trait Narrow<T>: Sized {
	/// Returns the projected form of `item`, or [`None`] if it lacks the shape.
	fn narrow(item: &T) -> Option<Self>;
}

impl<T: Clone> Narrow<T> for T {
	#[inline]
	fn narrow(item: &T) -> Option<Self> {
		Some(item.clone())
	}
}
