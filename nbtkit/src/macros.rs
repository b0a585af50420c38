// The muncher structure follows serde_json's json! macro, reshaped for NBT:
// compounds keep insertion order and the three array kinds get their own
// `[B; ..]`, `[I; ..]` and `[L; ..]` forms.

/// Build a [`Value`](crate::Value) from literal-looking syntax.
///
/// ```
/// use nbtkit::nbt;
///
/// let chunk = nbt!({
///     "Level": {
///         "xPos": 4,
///         "Sections": [{"Y": 0i8}, {"Y": 1i8}],
///         "Heights": [L; 1, 2, 3],
///     },
/// });
/// ```
///
/// Plain `[..]` brackets build a List; `[B; ..]`, `[I; ..]` and `[L; ..]`
/// build ByteArray, IntArray and LongArray values. Scalars go through
/// `Value::from`, so integer literals want a suffix when the default `i32`
/// is not intended.
#[macro_export]
macro_rules! nbt {
    //////////////////////////////////////////////////////////////////////////
    // List elements, collected into a vec.
    // Invoked as: nbt!(@list [] tokens...)
    //////////////////////////////////////////////////////////////////////////

    // Done with trailing comma.
    (@list [$($elems:expr,)*]) => {
        vec![$($elems,)*]
    };

    // Done without trailing comma.
    (@list [$($elems:expr),*]) => {
        vec![$($elems),*]
    };

    // Next element is an array or compound.
    (@list [$($elems:expr,)*] [$($inner:tt)*] $($rest:tt)*) => {
        $crate::nbt!(@list [$($elems,)* $crate::nbt!([$($inner)*])] $($rest)*)
    };

    (@list [$($elems:expr,)*] {$($inner:tt)*} $($rest:tt)*) => {
        $crate::nbt!(@list [$($elems,)* $crate::nbt!({$($inner)*})] $($rest)*)
    };

    // Next element is an expression followed by a comma.
    (@list [$($elems:expr,)*] $next:expr, $($rest:tt)*) => {
        $crate::nbt!(@list [$($elems,)* $crate::nbt!($next),] $($rest)*)
    };

    // Last element, no trailing comma.
    (@list [$($elems:expr,)*] $last:expr) => {
        $crate::nbt!(@list [$($elems,)* $crate::nbt!($last)])
    };

    // Comma after the most recent element.
    (@list [$($elems:expr),*] , $($rest:tt)*) => {
        $crate::nbt!(@list [$($elems,)*] $($rest)*)
    };

    //////////////////////////////////////////////////////////////////////////
    // Raw numeric elements of the typed arrays.
    //////////////////////////////////////////////////////////////////////////

    (@ints [$($elems:expr,)*]) => {
        vec![$($elems,)*]
    };

    (@ints [$($elems:expr),*]) => {
        vec![$($elems),*]
    };

    (@ints [$($elems:expr,)*] $next:expr, $($rest:tt)*) => {
        $crate::nbt!(@ints [$($elems,)* $next,] $($rest)*)
    };

    (@ints [$($elems:expr,)*] $last:expr) => {
        $crate::nbt!(@ints [$($elems,)* $last])
    };

    (@ints [$($elems:expr),*] , $($rest:tt)*) => {
        $crate::nbt!(@ints [$($elems,)*] $($rest)*)
    };

    //////////////////////////////////////////////////////////////////////////
    // Compound entries, inserted into the given map binding.
    // Invoked as: nbt!(@compound map () (tokens...))
    //////////////////////////////////////////////////////////////////////////

    // Done.
    (@compound $map:ident () ()) => {};

    // Insert the current entry followed by a trailing comma.
    (@compound $map:ident [$($key:tt)+] ($value:expr) , $($rest:tt)*) => {
        let _ = $map.insert(($($key)+).into(), $value);
        $crate::nbt!(@compound $map () ($($rest)*));
    };

    // Insert the last entry, no trailing comma.
    (@compound $map:ident [$($key:tt)+] ($value:expr)) => {
        let _ = $map.insert(($($key)+).into(), $value);
    };

    // Next value is an array or compound.
    (@compound $map:ident ($($key:tt)+) (: [$($inner:tt)*] $($rest:tt)*)) => {
        $crate::nbt!(@compound $map [$($key)+] ($crate::nbt!([$($inner)*])) $($rest)*);
    };

    (@compound $map:ident ($($key:tt)+) (: {$($inner:tt)*} $($rest:tt)*)) => {
        $crate::nbt!(@compound $map [$($key)+] ($crate::nbt!({$($inner)*})) $($rest)*);
    };

    // Next value is an expression followed by a comma.
    (@compound $map:ident ($($key:tt)+) (: $value:expr , $($rest:tt)*)) => {
        $crate::nbt!(@compound $map [$($key)+] ($crate::nbt!($value)) , $($rest)*);
    };

    // Last value, no trailing comma.
    (@compound $map:ident ($($key:tt)+) (: $value:expr)) => {
        $crate::nbt!(@compound $map [$($key)+] ($crate::nbt!($value)));
    };

    // Munch a token into the current key.
    (@compound $map:ident ($($key:tt)*) ($tt:tt $($rest:tt)*)) => {
        $crate::nbt!(@compound $map ($($key)* $tt) ($($rest)*));
    };

    //////////////////////////////////////////////////////////////////////////
    // The public entry points.
    //////////////////////////////////////////////////////////////////////////

    ([B;]) => {
        $crate::Value::ByteArray($crate::ByteArray::new(vec![]))
    };

    ([I;]) => {
        $crate::Value::IntArray($crate::IntArray::new(vec![]))
    };

    ([L;]) => {
        $crate::Value::LongArray($crate::LongArray::new(vec![]))
    };

    ([B; $($tt:tt)+]) => {
        $crate::Value::ByteArray($crate::ByteArray::new($crate::nbt!(@ints [] $($tt)+)))
    };

    ([I; $($tt:tt)+]) => {
        $crate::Value::IntArray($crate::IntArray::new($crate::nbt!(@ints [] $($tt)+)))
    };

    ([L; $($tt:tt)+]) => {
        $crate::Value::LongArray($crate::LongArray::new($crate::nbt!(@ints [] $($tt)+)))
    };

    ([]) => {
        $crate::Value::List(vec![])
    };

    ([ $($tt:tt)+ ]) => {
        $crate::Value::List($crate::nbt!(@list [] $($tt)+))
    };

    ({}) => {
        $crate::Value::Compound($crate::__private::IndexMap::new())
    };

    ({ $($tt:tt)+ }) => {
        $crate::Value::Compound({
            let mut map = $crate::__private::IndexMap::new();
            $crate::nbt!(@compound map () ($($tt)+));
            map
        })
    };

    // Anything `Value: From<T>` covers.
    ($other:expr) => {
        $crate::Value::from($other)
    };
}
