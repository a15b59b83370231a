//! Built-in receipt templates for 80mm and 58mm paper
//!
//! Used whenever a printer has no template of its own and the agent config
//! carries no company template. Variable names match the context built in
//! [`super::build_context`].

/// 80mm paper (48 columns)
pub const DEFAULT_TEMPLATE_80: &str = "\
[ALIGN:center]
[BOLD:on]
[SIZE:2]
{{loja_nome}}
[SIZE:1]
[BOLD:off]
[SEP:=]
[ALIGN:left]
Pedido #{{display_id}}       {{data}} {{hora}}
Tipo: {{tipo}}
[SEP]
[BOLD:on]
CLIENTE
[BOLD:off]
Nome: {{cliente_nome}}
Tel:  {{cliente_tel}}
{{#if tipo_delivery}}
End:  {{endereco_rua}}, {{endereco_num}} {{endereco_comp}}
      {{endereco_bairro}} - {{endereco_cidade}}
{{/if}}
{{#if endereco_ref}}
Ref:  {{endereco_ref}}
{{/if}}
[SEP]
[BOLD:on]
ITENS
[BOLD:off]
{{#each items}}
{{qtd}}x {{nome}}
{{#if tem_opcoes}}
{{opcoes}}
{{/if}}
{{#if obs}}
   Obs: {{obs}}
{{/if}}
   {{preco}}
{{/each}}
[SEP]
Subtotal:               {{subtotal}}
{{#if tem_taxa}}
Taxa de Entrega:        {{taxa}}
{{/if}}
{{#if tem_desconto}}
Desconto:              -{{desconto}}
{{/if}}
[SEP:=]
[BOLD:on]
TOTAL:                  {{total}}
[BOLD:off]
[SEP]
[BOLD:on]
PAGAMENTO
[BOLD:off]
{{#each pagamentos}}
{{metodo}}:             {{valor}}
{{/each}}
{{#if tem_obs}}
[SEP]
Obs: {{obs_pedido}}
{{/if}}
{{#if tem_qr}}
[SEP]
[ALIGN:center]
Rastreie seu pedido:
[QR:{{link_pedido}}]
[ALIGN:left]
{{/if}}
[FEED:3]
[CUT]";

/// 58mm paper (32 columns)
pub const DEFAULT_TEMPLATE_58: &str = "\
[ALIGN:center]
[BOLD:on]
{{loja_nome}}
[BOLD:off]
[SEP:=]
[ALIGN:left]
Pedido #{{display_id}}
{{data}} {{hora}} | {{tipo}}
[SEP]
{{cliente_nome}}
{{cliente_tel}}
{{#if tipo_delivery}}
{{endereco_rua}}, {{endereco_num}}
{{endereco_bairro}}
{{/if}}
[SEP]
[BOLD:on]
ITENS
[BOLD:off]
{{#each items}}
{{qtd}}x {{nome}}
{{#if tem_opcoes}}
{{opcoes}}
{{/if}}
{{#if obs}}
 -> {{obs}}
{{/if}}
{{preco}}
{{/each}}
[SEP]
{{#if tem_taxa}}
Entrega: {{taxa}}
{{/if}}
[BOLD:on]
TOTAL: {{total}}
[BOLD:off]
[SEP]
{{#each pagamentos}}
{{metodo}}: {{valor}}
{{/each}}
[FEED:3]
[CUT]";

/// Pick the built-in template matching a paper width
pub fn default_template_for_width(width_mm: u16) -> &'static str {
    if width_mm == 58 {
        DEFAULT_TEMPLATE_58
    } else {
        DEFAULT_TEMPLATE_80
    }
}
