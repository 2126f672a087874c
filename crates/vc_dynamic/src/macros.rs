/// Encodes any number of values with [`encode_any`](crate::encode_any()).
///
/// Each argument is converted with [`AnyRef::from`](crate::AnyRef), so it can be
/// a reference to a serializable value, a primitive, a `&str`, or a byte or
/// numeric slice.
///
/// # Examples
///
/// ```
/// use vc_dynamic::{Float64, Int, decode_any, encode_any};
///
/// let data = encode_any!(Int(15), Float64(3.14)).unwrap();
///
/// let (mut num, mut float) = (Int(0), Float64(0.0));
/// decode_any!(&data, &mut num, &mut float).unwrap();
///
/// assert_eq!((num, float), (Int(15), Float64(3.14)));
/// ```
#[macro_export]
macro_rules! encode_any {
    ($($value:expr),* $(,)?) => {
        $crate::encode_any(&[$($crate::AnyRef::from($value)),*])
    };
}

/// Decodes a sequence into any number of output slots with
/// [`decode_any`](crate::decode_any()).
///
/// The first argument is the encoded data, every further argument a
/// `&mut` reference to a [`DecodeTarget`](crate::DecodeTarget).
///
/// # Examples
///
/// ```
/// use vc_dynamic::{decode_any, encode_any};
///
/// let list = vec![1_i32, 2, 3];
/// let data = encode_any!("hello", &list[..]).unwrap();
///
/// let (mut text, mut list) = (String::new(), Vec::<i32>::new());
/// decode_any!(&data, &mut text, &mut list).unwrap();
///
/// assert_eq!(text, "hello");
/// assert_eq!(list, [1, 2, 3]);
/// ```
#[macro_export]
macro_rules! decode_any {
    ($data:expr $(, $slot:expr)* $(,)?) => {
        $crate::decode_any($data, &mut [$($slot as &mut dyn $crate::DecodeTarget),*])
    };
}
