//! Product pages shared by the scraping tests.

/// Divi variable product: entity-encoded variation payload plus one
/// attribute `<select>` per variation key.
pub const VARIABLE_PAGE: &str = r#"<html><body>
    <h1>Gummies</h1>
    <form class="variations_form cart" data-product_id="77" data-product_variations="[{&quot;attributes&quot;:{&quot;attribute_pa_flavor&quot;:&quot;mango&quot;,&quot;attribute_pa_size&quot;:&quot;10ct&quot;},&quot;display_price&quot;:19.99,&quot;display_regular_price&quot;:24,&quot;is_in_stock&quot;:true,&quot;sku&quot;:&quot;GUM-M-10&quot;,&quot;variation_id&quot;:101,&quot;image&quot;:{&quot;url&quot;:&quot;https:\/\/cdn.example.com\/mango.jpg&quot;,&quot;alt&quot;:&quot;Mango&quot;}},{&quot;attributes&quot;:{&quot;attribute_pa_flavor&quot;:&quot;grape&quot;,&quot;attribute_pa_size&quot;:&quot;25ct&quot;},&quot;display_price&quot;:&quot;39.50&quot;,&quot;display_regular_price&quot;:&quot;39.50&quot;,&quot;is_in_stock&quot;:false,&quot;sku&quot;:&quot;&quot;,&quot;variation_id&quot;:102,&quot;image&quot;:{&quot;url&quot;:&quot;&quot;},&quot;display_name&quot;:&quot;Grape 25ct&quot;}]">
      <table class="variations"><tbody>
        <tr><th><label for="pa_flavor">Flavor</label></th>
            <td><select id="pa_flavor" name="attribute_pa_flavor">
                <option value="">Choose an option</option>
                <option value="mango">Mango</option>
                <option value="grape">Grape</option>
            </select></td></tr>
        <tr><th><label for="pa_size"> Size </label></th>
            <td><select id="pa_size" name="attribute_pa_size">
                <option value="">Choose an option</option>
                <option value="10ct">10 count</option>
                <option value="25ct">25 count</option>
            </select></td></tr>
      </tbody></table>
    </form>
</body></html>"#;
